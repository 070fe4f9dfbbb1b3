//! Insertion-ordered record of philosopher deaths.
//!
//! Populated synchronously by the table as each death is published.
//! Purely for post-hoc inspection; never consulted for arbitration. It
//! has its own lock and never contends with the arbitration critical
//! section.

use std::sync::Mutex;
use std::time::SystemTime;

/// One recorded death.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathRecord {
    /// When the death event was published.
    pub at: SystemTime,
    /// Philosopher id.
    pub id: u64,
    /// Philosopher name.
    pub name: String,
}

/// Append-only death registry.
///
/// Records are kept in insertion order; two deaths at the same instant
/// both survive (unlike a timestamp-keyed map, which would silently
/// overwrite one of them).
#[derive(Debug, Default)]
pub struct DeathLedger {
    records: Mutex<Vec<DeathRecord>>,
}

impl DeathLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, at: SystemTime, id: u64, name: &str) {
        self.guard().push(DeathRecord {
            at,
            id,
            name: name.to_owned(),
        });
    }

    /// Number of recorded deaths.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// True when no death has been recorded.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Copy of all records in insertion order.
    pub fn snapshot(&self) -> Vec<DeathRecord> {
        self.guard().clone()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<DeathRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}
