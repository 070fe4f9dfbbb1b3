//! Subscriber contract for external listeners.
//!
//! [`Subscribe`] is the extension point for plugging displays, loggers or
//! metrics into the simulation. Each subscriber is driven by a dedicated
//! worker fed from a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet), so a slow
//! subscriber never blocks the philosophers or other subscribers. Delivery
//! to a UI thread, if any, is the subscriber's own concern.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for simulation event subscribers.
///
/// Called from a subscriber-dedicated worker task, in FIFO order per
/// subscriber. Implementations should avoid blocking the async runtime.
///
/// Panics are caught by the worker and logged; other subscribers are
/// unaffected.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, events for this subscriber are dropped with a warning;
    /// other subscribers are unaffected. Clamped to a minimum of 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
