//! # symposium
//!
//! A dining-philosophers simulation: a ring of independent async actors
//! that cycle through THINKING, HUNGRY, EATING and a terminal DEAD state,
//! competing for a shared, depleting food pool through a centralized
//! arbitrator that enforces a non-adjacency eating constraint.
//!
//! ## Architecture
//! ```text
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │ Philosopher  │  │ Philosopher  │  │ Philosopher  │   (state machines)
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         ▼                 ▼                 ▼
//!  ┌───────────────────────────────────────────────────┐
//!  │  PhilosopherActor per seat (tokio task)           │
//!  │  think / request food / eat / decay / starve      │
//!  └──────┬───────────────────────────────────┬────────┘
//!         │ request_food (serialized)         │ events
//!         ▼                                   ▼
//!  ┌──────────────────┐              ┌─────────────────┐
//!  │  Table           │── events ──► │  Bus (broadcast)│
//!  │  - ring + pool   │              └───────┬─────────┘
//!  │  - Arbiter       │                      │
//!  │  - DeathLedger   │                      └─► SubscriberSet ─► Subscribe
//!  │  - cancellation  │
//!  └──────────────────┘
//! ```
//!
//! Two typed notification channels replace the classic polymorphic
//! observer: food requests go straight into [`Table`]'s mutex-guarded
//! arbitration, and everything observable comes back out as [`Event`]s on
//! a broadcast bus, fanned out to [`Subscribe`] implementations.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use symposium::{Config, LogWriter, Table};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::new(5, Duration::from_millis(500));
//!     let table = Table::new(cfg, vec![Arc::new(LogWriter)])?;
//!     table.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod model;
mod subscribers;

// ---- Public re-exports ----

pub use crate::config::Config;
pub use crate::core::{DeathRecord, PhilosopherView, Table};
pub use crate::error::{RuntimeError, SetupError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::model::{Food, Philosopher, State};
pub use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};
