//! Simulation events: data model and broadcast bus.
//!
//! This is one of the two notification channels of the engine (the other
//! is the direct, serialized food-request call into the table). Everything
//! observable — state changes, arbitration outcomes, actor lifecycle —
//! flows through here as typed [`Event`]s.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
