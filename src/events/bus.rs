//! Broadcast bus for simulation events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The table
//! publishes (on its own behalf and for its actors); the subscriber
//! fan-out and any raw receivers consume. Dropping every `Bus` clone
//! closes the channel, which is how downstream consumers learn the
//! simulation is gone.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: one ring buffer shared by all receivers; slow
//!   receivers observe `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events published with no live receiver are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for simulation events.
///
/// Cheap to clone (the sender is `Arc`-backed internally). Within a
/// simulation the table holds the only clone, so the channel closes when
/// the table is dropped.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Returns immediately; if there are no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new independent receiver.
    ///
    /// A receiver only observes events published **after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
