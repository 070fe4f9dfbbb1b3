//! Philosopher lifecycle states.

use std::fmt;

/// Hunger state of a philosopher.
///
/// `Dead` is terminal: [`Philosopher::transition`](crate::Philosopher)
/// refuses to leave it.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Pondering life and space; hunger decays each turn.
    Thinking = 0,
    /// Below half the hunger threshold; asks the table for food each turn.
    Hungry = 1,
    /// Holds exclusive use of a food unit; consumes it next turn.
    Eating = 2,
    /// Starved. Terminal.
    Dead = 3,
}

impl State {
    /// Decodes a state from its `u8` representation.
    ///
    /// Used to read states back out of atomic storage; the stored value is
    /// always produced by `as u8` on a valid state.
    pub(crate) fn from_u8(raw: u8) -> State {
        match raw {
            0 => State::Thinking,
            1 => State::Hungry,
            2 => State::Eating,
            _ => State::Dead,
        }
    }

    /// Short lowercase label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Thinking => "thinking",
            State::Hungry => "hungry",
            State::Eating => "eating",
            State::Dead => "dead",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
