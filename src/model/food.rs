//! A shared, depleting food unit.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};

/// One unit in the table's food pool.
///
/// The remaining quantity only ever decreases, and only the philosopher
/// that currently holds exclusive use (the `taken` flag) may decrease it.
/// The flag itself is set inside the table's arbitration critical section
/// and cleared by the holder on release.
///
/// A unit whose quantity reaches zero stays in the pool but is never
/// granted again (it is inert).
#[derive(Debug)]
pub struct Food {
    name: Arc<str>,
    remaining: AtomicU32,
    taken: AtomicBool,
}

impl Food {
    /// Creates a food unit with the given name and starting quantity.
    ///
    /// Rejects an empty name and a zero quantity.
    pub fn new(name: impl Into<Arc<str>>, quantity: u32) -> Result<Self, crate::SetupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(crate::SetupError::EmptyName { field: "food name" });
        }
        if quantity == 0 {
            return Err(crate::SetupError::ZeroQuantity);
        }
        Ok(Self {
            name,
            remaining: AtomicU32::new(quantity),
            taken: AtomicBool::new(false),
        })
    }

    /// The food's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Quantity left in this unit.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Whether a philosopher currently holds exclusive use of this unit.
    pub fn is_taken(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }

    pub(crate) fn set_taken(&self, taken: bool) {
        self.taken.store(taken, Ordering::Release);
    }

    /// Removes `amount` from the unit.
    ///
    /// Only the exclusive holder calls this, with an amount already capped
    /// at the remaining quantity. The subtraction saturates so the quantity
    /// can never underflow even on a contract violation.
    pub(crate) fn remove(&self, amount: u32) {
        debug_assert!(amount <= self.remaining());
        let _ = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_sub(amount))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SetupError;

    #[test]
    fn test_rejects_empty_name() {
        let err = Food::new("", 10).unwrap_err();
        assert_eq!(err, SetupError::EmptyName { field: "food name" });
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = Food::new("rice", 0).unwrap_err();
        assert_eq!(err, SetupError::ZeroQuantity);
    }

    #[test]
    fn test_remove_decrements() {
        let food = Food::new("rice", 10).unwrap();
        food.remove(4);
        assert_eq!(food.remaining(), 6);
        food.remove(6);
        assert_eq!(food.remaining(), 0);
    }

    #[test]
    fn test_taken_flag() {
        let food = Food::new("apple", 5).unwrap();
        assert!(!food.is_taken());
        food.set_taken(true);
        assert!(food.is_taken());
        food.set_taken(false);
        assert!(!food.is_taken());
    }
}
