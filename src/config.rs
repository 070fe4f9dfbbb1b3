//! Global simulation configuration.
//!
//! [`Config`] carries the two parameters the external interface cares about
//! (philosopher count and turn delay) plus the ambient runtime knobs
//! (event bus capacity, shutdown grace).
//!
//! ## Field semantics
//! - `philosophers`: ring size (validated ≥ 1 by [`Table::new`](crate::Table::new))
//! - `turn_delay`: pause between lifecycle turns (`0` = as fast as the
//!   scheduler allows; useful for tests)
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
//! - `grace`: maximum wait for actors to exit after a stop request

use std::time::Duration;

/// Configuration for one simulation run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of philosophers seated around the table.
    pub philosophers: usize,

    /// Delay between lifecycle turns (thinking, retrying, digesting).
    pub turn_delay: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than this many events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Maximum time to wait for philosopher actors to exit after
    /// [`stop_simulation`](crate::Table::stop_simulation).
    pub grace: Duration,
}

impl Config {
    /// Creates a config from the two external parameters, with default
    /// bus capacity and grace.
    pub fn new(philosophers: usize, turn_delay: Duration) -> Self {
        Self {
            philosophers,
            turn_delay,
            ..Self::default()
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Defaults: 5 philosophers, 500 ms turns, bus capacity 1024, 5 s grace.
    fn default() -> Self {
        Self {
            philosophers: 5,
            turn_delay: Duration::from_millis(500),
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_ambient_defaults() {
        let cfg = Config::new(3, Duration::from_millis(10));
        assert_eq!(cfg.philosophers, 3);
        assert_eq!(cfg.turn_delay, Duration::from_millis(10));
        assert_eq!(cfg.bus_capacity, Config::default().bus_capacity);
        assert_eq!(cfg.grace, Config::default().grace);
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
