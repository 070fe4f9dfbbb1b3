//! Tracks which philosopher actors are currently running.
//!
//! Maintained synchronously by the table when actors start and exit.
//! Used only to name stuck actors when the shutdown grace period is
//! exceeded.

use std::collections::BTreeSet;
use std::sync::Mutex;

/// Set of running actor names.
#[derive(Debug, Default)]
pub(crate) struct AliveTracker {
    running: Mutex<BTreeSet<String>>,
}

impl AliveTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn started(&self, name: &str) {
        self.guard().insert(name.to_owned());
    }

    pub(crate) fn exited(&self, name: &str) {
        self.guard().remove(name);
    }

    /// Names of actors that have started but not yet exited, sorted.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.guard().iter().cloned().collect()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}
