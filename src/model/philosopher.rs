//! The philosopher state machine.
//!
//! [`Philosopher`] holds the per-actor state (hunger, lifecycle state, held
//! food unit, meal counter) behind atomics so the table's arbiter can read
//! neighbor states concurrently with the owning actor's loop. It performs
//! no I/O and publishes nothing itself: every mutating method reports the
//! state transition it caused (if any) and the caller — the actor loop or
//! the table — turns that into an event.
//!
//! ## Transition rules
//! - `Dead` is sticky: [`Philosopher::transition`] never leaves it, and a
//!   transition to the current state is a no-op. Both cases report `None`
//!   so no stale change notification is ever emitted.
//! - Hunger decays by one per turn, except while `Eating`.
//! - `Thinking` flips to `Hungry` once hunger falls to half the threshold.

use std::sync::{
    atomic::{AtomicU32, AtomicU8, Ordering},
    Arc, Mutex,
};

use rand::Rng;

use crate::{
    model::{Food, State},
    SetupError,
};

/// Default starting hunger for the fixed start mode.
const DEFAULT_START_HUNGER: u32 = 5;

/// The outcome of consuming a held food unit.
#[derive(Debug)]
pub(crate) struct Meal {
    /// Name of the food that was eaten.
    pub food: Arc<str>,
    /// Amount actually consumed (capped at the unit's remaining quantity).
    pub amount: u32,
    /// State change caused by finishing the meal (back to `Thinking`).
    pub transition: Option<State>,
}

/// One actor in the ring: identity, hunger bookkeeping, held food.
#[derive(Debug)]
pub struct Philosopher {
    id: u64,
    name: Arc<str>,
    /// Hunger level that counts as "full"; eating tops hunger up toward it.
    threshold: u32,
    hunger: AtomicU32,
    state: AtomicU8,
    meals: AtomicU32,
    held: Mutex<Option<Arc<Food>>>,
}

impl Philosopher {
    /// Creates a philosopher with the fixed starting hunger (5, clamped to
    /// the threshold).
    pub fn new(
        id: u64,
        name: impl Into<Arc<str>>,
        threshold: u32,
    ) -> Result<Self, SetupError> {
        Self::with_hunger(id, name, threshold, DEFAULT_START_HUNGER)
    }

    /// Creates a philosopher with a random starting hunger in
    /// `[threshold/2, threshold)`.
    pub fn with_random_hunger(
        id: u64,
        name: impl Into<Arc<str>>,
        threshold: u32,
    ) -> Result<Self, SetupError> {
        if threshold == 0 {
            return Err(SetupError::ZeroThreshold);
        }
        let start = if threshold == 1 {
            1
        } else {
            rand::rng().random_range(threshold / 2..threshold)
        };
        Self::with_hunger(id, name, threshold, start)
    }

    /// Creates a philosopher with an explicit starting hunger (clamped to
    /// the threshold).
    pub fn with_hunger(
        id: u64,
        name: impl Into<Arc<str>>,
        threshold: u32,
        hunger: u32,
    ) -> Result<Self, SetupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SetupError::EmptyName {
                field: "philosopher name",
            });
        }
        if threshold == 0 {
            return Err(SetupError::ZeroThreshold);
        }
        Ok(Self {
            id,
            name,
            threshold,
            hunger: AtomicU32::new(hunger.min(threshold)),
            state: AtomicU8::new(State::Thinking as u8),
            meals: AtomicU32::new(0),
            held: Mutex::new(None),
        })
    }

    /// Stable identity, unique within a table.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current hunger level (0 = starved).
    pub fn hunger(&self) -> u32 {
        self.hunger.load(Ordering::Acquire)
    }

    /// The hunger level that counts as full.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// How many times this philosopher has eaten.
    pub fn meals(&self) -> u32 {
        self.meals.load(Ordering::Acquire)
    }

    /// Whether a food unit is currently held.
    pub fn holds_food(&self) -> bool {
        self.held_guard().is_some()
    }

    /// Moves to `to`, reporting `Some(to)` only when the state actually
    /// changed and the previous state was not `Dead`.
    pub(crate) fn transition(&self, to: State) -> Option<State> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == State::Dead as u8 || current == to as u8 {
                return None;
            }
            match self.state.compare_exchange_weak(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(to),
                Err(actual) => current = actual,
            }
        }
    }

    /// One turn of hunger decay: −1 unless eating, then `Thinking` flips
    /// to `Hungry` once hunger is at or below half the threshold.
    pub(crate) fn decay(&self) -> Option<State> {
        match self.state() {
            State::Eating | State::Dead => return None,
            State::Thinking | State::Hungry => {}
        }
        let _ = self
            .hunger
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |h| {
                Some(h.saturating_sub(1))
            });
        if self.hunger() <= self.threshold / 2 {
            self.transition(State::Hungry)
        } else {
            None
        }
    }

    /// Accepts a food unit from the table and moves to `Eating`.
    ///
    /// Table-only: the caller must have marked the unit as taken inside the
    /// arbitration critical section.
    pub(crate) fn receive_food(&self, food: Arc<Food>) -> Option<State> {
        *self.held_guard() = Some(food);
        self.transition(State::Eating)
    }

    /// Consumes the held food unit: eats `threshold − hunger`, capped at
    /// the unit's remaining quantity, releases the unit, and moves back to
    /// `Thinking`. Returns `None` when nothing is held.
    pub(crate) fn consume(&self) -> Option<Meal> {
        let food = self.held_guard().take()?;
        let want = self.threshold.saturating_sub(self.hunger());
        let amount = want.min(food.remaining());
        food.remove(amount);
        self.hunger.fetch_add(amount, Ordering::AcqRel);
        self.meals.fetch_add(1, Ordering::AcqRel);
        food.set_taken(false);
        Some(Meal {
            food: food.name_arc(),
            amount,
            transition: self.transition(State::Thinking),
        })
    }

    /// Terminal starvation transition.
    pub(crate) fn starve(&self) -> Option<State> {
        self.transition(State::Dead)
    }

    fn held_guard(&self) -> std::sync::MutexGuard<'_, Option<Arc<Food>>> {
        // Held-food updates cannot panic mid-update; recover the guard
        // rather than propagate poison.
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }
}
