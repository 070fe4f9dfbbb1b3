//! Error types for table setup and runtime orchestration.
//!
//! Two enums cover the two failure surfaces:
//!
//! - [`SetupError`] — construction-time validation. These propagate
//!   synchronously to the caller and leave no partial object behind.
//! - [`RuntimeError`] — failures of the simulation runtime itself
//!   (double start, shutdown grace exceeded).
//!
//! Steady-state outcomes — contention rejections, starvation, cooperative
//! cancellation — are **not** errors. They are published as events on the
//! [`Bus`](crate::events::Bus) and the simulation keeps running.

use std::time::Duration;
use thiserror::Error;

/// Construction-time validation failures.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// A required name was empty.
    #[error("the {field} cannot be empty")]
    EmptyName {
        /// Which field was empty ("food name", "philosopher name", ...).
        field: &'static str,
    },

    /// A food unit was created with zero quantity.
    #[error("the amount of food must be larger than 0")]
    ZeroQuantity,

    /// A philosopher was created with a zero hunger threshold.
    #[error("the hunger threshold must be larger than 0")]
    ZeroThreshold,

    /// A table needs at least one philosopher in the ring.
    #[error("a table needs at least one philosopher")]
    NoPhilosophers,

    /// A table needs at least one food unit in the pool.
    #[error("a table needs at least one food unit")]
    NoFood,
}

/// Failures of the simulation runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start_simulation` was called more than once on the same table.
    #[error("the simulation was already started")]
    AlreadyStarted,

    /// Shutdown grace period elapsed with philosopher actors still running.
    #[error("shutdown grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of philosophers whose actors had not exited in time.
        stuck: Vec<String>,
    },
}
