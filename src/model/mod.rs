//! Domain data model: food units, philosopher state machines, lifecycle states.
//!
//! The model layer is synchronous and event-free. State lives behind
//! atomics so the [`Table`](crate::Table) arbiter and snapshot views can
//! read it concurrently with the owning actor; every mutation reports the
//! transition it caused so the runtime layer can publish events.

mod food;
mod philosopher;
mod state;

pub use food::Food;
pub use philosopher::Philosopher;
pub use state::State;
