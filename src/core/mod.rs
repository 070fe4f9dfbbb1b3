//! Runtime core: coordination and lifecycle.
//!
//! The public API from this module is [`Table`], plus the read-only
//! [`PhilosopherView`] and [`DeathRecord`] snapshots.
//!
//! Internal modules:
//! - [`actor`]: drives one philosopher's lifecycle loop;
//! - [`arbiter`]: the serialized grant/reject decision with fairness;
//! - [`ledger`]: insertion-ordered death records;
//! - [`alive`]: running-actor set for shutdown diagnostics.

mod actor;
mod alive;
mod arbiter;
mod ledger;
mod table;

pub use ledger::DeathRecord;
pub use table::{PhilosopherView, Table};
