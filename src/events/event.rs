//! Simulation events emitted by philosophers, the table, and the runtime.
//!
//! [`EventKind`] classifies events across three categories:
//! - **state machine**: philosopher state changes and turn activity
//! - **arbitration**: grant/reject outcomes of food requests
//! - **runtime**: actor lifecycle and shutdown progress
//!
//! [`Event`] carries the metadata for each kind (philosopher id/name,
//! state, food name, amounts, free-form reason).
//!
//! ## Ordering
//! Each event gets a globally unique, monotonically increasing sequence
//! number (`seq`). Subscribers that observe events out of order can use it
//! to restore the publication order.

use std::sync::{
    atomic::{AtomicU64, Ordering as AtomicOrdering},
    Arc,
};
use std::time::SystemTime;

use crate::model::State;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of simulation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Philosopher state machine ===
    /// A philosopher's state changed.
    ///
    /// Sets: `id`, `philosopher`, `state`. Never emitted for a transition
    /// out of `Dead` (there are none) or a no-op transition.
    StateChanged,

    /// A philosopher spent a turn thinking.
    ///
    /// Sets: `id`, `philosopher`.
    Thinking,

    /// A philosopher consumed (part of) its held food unit.
    ///
    /// Sets: `id`, `philosopher`, `food`, `amount` (units eaten).
    Ate,

    /// A philosopher starved: hunger reached zero.
    ///
    /// Sets: `id`, `philosopher`, `amount` (lifetime meal count).
    Starved,

    /// A philosopher observed cancellation and exited without dying.
    ///
    /// Sets: `id`, `philosopher`.
    Aborted,

    // === Arbitration ===
    /// The table granted a food unit to a hungry philosopher.
    ///
    /// Sets: `id`, `philosopher`, `food`.
    FoodServed,

    /// A request was rejected because a ring neighbor is eating.
    ///
    /// Sets: `id`, `philosopher`, `reason` (the blocking neighbor names).
    RequestBlocked,

    /// A request was deferred in favor of a longer-waiting philosopher.
    ///
    /// Sets: `id`, `philosopher`, `reason` (who was preferred).
    RequestYielded,

    /// A hungry philosopher came away from a request without food.
    ///
    /// Sets: `id`, `philosopher`. A diagnostic, not a state change.
    NoFoodAvailable,

    // === Runtime ===
    /// A philosopher actor's loop started.
    ///
    /// Sets: `id`, `philosopher`.
    ActorStarted,

    /// A philosopher actor's loop exited (death or abort).
    ///
    /// Sets: `id`, `philosopher`.
    ActorExited,

    /// Cooperative stop was requested (external call or auto-stop).
    StopRequested,

    /// All actors exited within the configured grace period.
    AllStoppedWithin,

    /// Grace period elapsed with actors still running.
    GraceExceeded,
}

/// Simulation event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs and the death ledger)
/// - other fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Philosopher id, if applicable.
    pub id: Option<u64>,
    /// Philosopher name, if applicable.
    pub philosopher: Option<Arc<str>>,
    /// New state, for `StateChanged`.
    pub state: Option<State>,
    /// Food name, if applicable.
    pub food: Option<Arc<str>>,
    /// Amount eaten (`Ate`) or lifetime meal count (`Starved`).
    pub amount: Option<u32>,
    /// Human-readable reason (blocking neighbors, yield target, ...).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            id: None,
            philosopher: None,
            state: None,
            food: None,
            amount: None,
            reason: None,
        }
    }

    /// Attaches a philosopher id.
    #[inline]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a philosopher name.
    #[inline]
    pub fn with_philosopher(mut self, name: impl Into<Arc<str>>) -> Self {
        self.philosopher = Some(name.into());
        self
    }

    /// Attaches a state.
    #[inline]
    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a food name.
    #[inline]
    pub fn with_food(mut self, food: impl Into<Arc<str>>) -> Self {
        self.food = Some(food.into());
        self
    }

    /// Attaches an amount.
    #[inline]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for the `StateChanged` kind with the given state attached.
    #[inline]
    pub fn is_state_change_to(&self, state: State) -> bool {
        self.kind == EventKind::StateChanged && self.state == Some(state)
    }
}
