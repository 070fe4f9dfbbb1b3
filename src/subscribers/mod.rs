//! External event subscribers.
//!
//! The presentation layer attaches here: implement [`Subscribe`], hand it
//! to [`Table::new`](crate::Table::new), and receive every simulation
//! [`Event`](crate::Event) on a dedicated worker.
//!
//! ```text
//! actors/table ── publish ──► Bus ──► forward(rx) ──► SubscriberSet
//!                                                     ┌───────┼───────┐
//!                                                     ▼       ▼       ▼
//!                                                  display  LogWriter ...
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
