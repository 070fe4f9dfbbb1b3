//! The serialized grant/reject decision for food requests.
//!
//! [`Arbiter`] holds the only mutable arbitration state (per-philosopher
//! deferral counters) and evaluates one request at a time — the table
//! keeps it behind a mutex, which is what makes grant decisions totally
//! ordered and the neighbor-exclusion invariant race-free.
//!
//! ## Decision order
//! 1. pool exhausted → [`Decision::Exhausted`] (the table decides whether
//!    to stop the run)
//! 2. requester no longer hungry (e.g. starved while queued) → no grant
//! 3. a ring neighbor is eating → [`Decision::Blocked`], deferral +1
//! 4. a longer-deferred, currently-eligible hungry philosopher exists →
//!    [`Decision::Yielded`] (fairness; replaces the original's
//!    thread-priority nudge)
//! 5. first untaken, non-empty food unit in insertion order →
//!    [`Decision::Served`], deferral reset; otherwise [`Decision::NoFood`]

use std::sync::Arc;

use crate::model::{Food, Philosopher, State};

/// Outcome of one arbitration decision.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Grant: hand the food unit at this pool index to the requester.
    Served { food: usize },
    /// A ring neighbor is eating; formatted blocker description attached.
    Blocked { eaters: String },
    /// Deferred in favor of a longer-waiting philosopher.
    Yielded { to: Arc<str> },
    /// No untaken, non-empty unit left right now; retry next turn.
    NoFood,
    /// Every unit in the pool is empty.
    Exhausted,
    /// The requester is not in the `Hungry` state; nothing to do.
    NotHungry,
}

/// Arbitration state: consecutive-deferral counters, one per ring seat.
#[derive(Debug)]
pub(crate) struct Arbiter {
    deferrals: Vec<u32>,
}

impl Arbiter {
    pub(crate) fn new(seats: usize) -> Self {
        Self {
            deferrals: vec![0; seats],
        }
    }

    /// Evaluates the request from the philosopher at ring `index`.
    ///
    /// The caller holds the table-wide arbitration lock, so reads of
    /// neighbor states and taken flags cannot race another decision.
    pub(crate) fn decide(
        &mut self,
        index: usize,
        ring: &[Arc<Philosopher>],
        foods: &[Arc<Food>],
    ) -> Decision {
        if foods.iter().all(|f| f.remaining() == 0) {
            return Decision::Exhausted;
        }
        let requester = &ring[index];
        if requester.state() != State::Hungry {
            return Decision::NotHungry;
        }

        let eaters = self.eating_neighbors(index, ring);
        if !eaters.is_empty() {
            self.deferrals[index] += 1;
            let names = eaters
                .iter()
                .map(|i| ring[*i].name())
                .collect::<Vec<_>>()
                .join(", ");
            return Decision::Blocked {
                eaters: format!("{} beside {} is eating.", names, requester.name()),
            };
        }

        // Fairness: give way to a hungrier-waiting, currently-eligible seat.
        let mine = self.deferrals[index];
        let preferred = (0..ring.len())
            .filter(|&j| j != index)
            .filter(|&j| ring[j].state() == State::Hungry)
            .filter(|&j| self.deferrals[j] > mine)
            .filter(|&j| self.eating_neighbors(j, ring).is_empty())
            .max_by_key(|&j| self.deferrals[j]);
        if let Some(j) = preferred {
            return Decision::Yielded {
                to: ring[j].name_arc(),
            };
        }

        match foods
            .iter()
            .position(|f| !f.is_taken() && f.remaining() > 0)
        {
            Some(food) => {
                self.deferrals[index] = 0;
                Decision::Served { food }
            }
            None => Decision::NoFood,
        }
    }

    /// Ring indices of the requester's neighbors that are eating.
    ///
    /// With a ring of one, the philosopher is its own neighbor; it is
    /// `Hungry` while requesting, so it never blocks itself.
    fn eating_neighbors(&self, index: usize, ring: &[Arc<Philosopher>]) -> Vec<usize> {
        let n = ring.len();
        let before = (index + n - 1) % n;
        let after = (index + 1) % n;
        let mut sides = vec![before];
        if after != before {
            sides.push(after);
        }
        sides.retain(|i| ring[*i].state() == State::Eating);
        sides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> Vec<Arc<Philosopher>> {
        (0..n)
            .map(|i| {
                Arc::new(Philosopher::with_hunger(i as u64 + 1, format!("P{i}"), 8, 4).unwrap())
            })
            .collect()
    }

    fn pool(quantities: &[u32]) -> Vec<Arc<Food>> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, q)| Arc::new(Food::new(format!("food{i}"), *q).unwrap()))
            .collect()
    }

    fn make_hungry(p: &Philosopher) {
        p.transition(State::Hungry);
    }

    fn make_eating(p: &Philosopher, food: &Arc<Food>) {
        food.set_taken(true);
        p.receive_food(Arc::clone(food));
    }

    #[test]
    fn test_serves_first_available_unit_in_order() {
        let ring = ring(3);
        let foods = pool(&[5, 5]);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(3);
        assert_eq!(arb.decide(0, &ring, &foods), Decision::Served { food: 0 });

        foods[0].set_taken(true);
        make_hungry(&ring[1]);
        // Seat 1 is beside seat 0, which is still hungry (the grant above
        // did not call receive_food), so the scan falls through to unit 1.
        assert_eq!(arb.decide(1, &ring, &foods), Decision::Served { food: 1 });
    }

    #[test]
    fn test_blocked_by_eating_neighbor() {
        let ring = ring(3);
        let foods = pool(&[5, 5]);
        make_eating(&ring[1], &foods[0]);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(3);
        match arb.decide(0, &ring, &foods) {
            Decision::Blocked { eaters } => {
                assert_eq!(eaters, "P1 beside P0 is eating.");
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert_eq!(arb.deferrals[0], 1);
    }

    #[test]
    fn test_blocked_names_both_neighbors() {
        let ring = ring(4);
        let foods = pool(&[9, 9]);
        make_eating(&ring[3], &foods[0]);
        make_eating(&ring[1], &foods[1]);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(4);
        match arb.decide(0, &ring, &foods) {
            Decision::Blocked { eaters } => {
                assert_eq!(eaters, "P3, P1 beside P0 is eating.");
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
    }

    #[test]
    fn test_ring_of_one_grants_itself() {
        let ring = ring(1);
        let foods = pool(&[5]);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(1);
        assert_eq!(arb.decide(0, &ring, &foods), Decision::Served { food: 0 });
    }

    #[test]
    fn test_ring_of_two_checks_shared_neighbor_once() {
        let ring = ring(2);
        let foods = pool(&[5, 5]);
        make_eating(&ring[1], &foods[0]);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(2);
        match arb.decide(0, &ring, &foods) {
            Decision::Blocked { eaters } => {
                // Same philosopher on both sides; named once.
                assert_eq!(eaters, "P1 beside P0 is eating.");
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
    }

    #[test]
    fn test_yields_to_longer_deferred_eligible_seat() {
        let ring = ring(5);
        let foods = pool(&[9]);
        make_hungry(&ring[0]);
        make_hungry(&ring[2]);

        let mut arb = Arbiter::new(5);
        arb.deferrals[2] = 3;
        match arb.decide(0, &ring, &foods) {
            Decision::Yielded { to } => assert_eq!(&*to, "P2"),
            other => panic!("expected Yielded, got {other:?}"),
        }
        // The preferred seat itself is then served and its counter resets.
        assert_eq!(arb.decide(2, &ring, &foods), Decision::Served { food: 0 });
        assert_eq!(arb.deferrals[2], 0);
    }

    #[test]
    fn test_no_yield_to_blocked_seat() {
        let ring = ring(5);
        let foods = pool(&[9, 9]);
        make_eating(&ring[3], &foods[1]);
        make_hungry(&ring[0]);
        make_hungry(&ring[2]);

        let mut arb = Arbiter::new(5);
        arb.deferrals[2] = 3;
        // Seat 2 waits longer but is blocked by eating seat 3, so seat 0
        // is served rather than deferred.
        assert_eq!(arb.decide(0, &ring, &foods), Decision::Served { food: 0 });
    }

    #[test]
    fn test_no_food_when_all_units_taken() {
        let ring = ring(3);
        let foods = pool(&[5]);
        foods[0].set_taken(true);
        make_hungry(&ring[1]);

        let mut arb = Arbiter::new(3);
        assert_eq!(arb.decide(1, &ring, &foods), Decision::NoFood);
    }

    #[test]
    fn test_exhausted_pool() {
        let ring = ring(3);
        let foods = pool(&[1]);
        foods[0].remove(1);
        make_hungry(&ring[0]);

        let mut arb = Arbiter::new(3);
        assert_eq!(arb.decide(0, &ring, &foods), Decision::Exhausted);
    }

    #[test]
    fn test_dead_requester_is_never_granted() {
        let ring = ring(3);
        let foods = pool(&[5]);
        ring[0].starve();

        let mut arb = Arbiter::new(3);
        assert_eq!(arb.decide(0, &ring, &foods), Decision::NotHungry);
    }
}
