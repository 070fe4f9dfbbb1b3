//! The per-philosopher lifecycle loop.
//!
//! One [`PhilosopherActor`] runs per philosopher, on its own tokio task.
//! Each turn:
//!
//! ```text
//! loop {
//!   ├─► cancelled?          → publish Aborted, exit (no state change)
//!   ├─► hunger == 0?        → publish Starved, transition DEAD, exit
//!   ├─► branch on state:
//!   │     Thinking → publish Thinking
//!   │     Hungry   → table.request_food() ─► serialized arbitration
//!   │                (still not eating → publish NoFoodAvailable)
//!   │     Eating   → consume held unit, publish Ate, back to Thinking
//!   └─► sleep_and_live: cancellable turn delay, then hunger decay
//!        (no decay while Eating)
//! }
//! ```
//!
//! Cancellation is checked at the loop top and during the sleep, so
//! shutdown latency is bounded by roughly one turn delay. The actor never
//! blocks on another philosopher except inside the table's arbitration
//! call.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    core::table::Table,
    events::{Event, EventKind},
    model::{Philosopher, State},
};

/// Drives one philosopher's state machine to completion.
pub(crate) struct PhilosopherActor {
    pub philosopher: Arc<Philosopher>,
    pub table: Arc<Table>,
    /// Seat in the table's ring; defines adjacency.
    pub index: usize,
    pub delay: Duration,
}

impl PhilosopherActor {
    /// Runs the loop until starvation or cancellation. Invoked exactly
    /// once per philosopher by [`Table::start_simulation`].
    pub(crate) async fn run(self, token: CancellationToken) {
        let phil = &self.philosopher;
        self.table.note_actor_started(phil);

        loop {
            if token.is_cancelled() {
                self.publish(EventKind::Aborted);
                break;
            }
            if phil.hunger() == 0 {
                self.die_of_hunger();
                break;
            }

            match phil.state() {
                State::Thinking => {
                    self.publish(EventKind::Thinking);
                }
                State::Hungry => {
                    self.table.request_food(self.index).await;
                    if phil.state() != State::Eating {
                        self.publish(EventKind::NoFoodAvailable);
                    }
                }
                State::Eating => {
                    if let Some(meal) = phil.consume() {
                        self.table.bus().publish(
                            Event::now(EventKind::Ate)
                                .with_id(phil.id())
                                .with_philosopher(phil.name_arc())
                                .with_food(meal.food)
                                .with_amount(meal.amount),
                        );
                        if let Some(state) = meal.transition {
                            self.table.publish_state_change(phil, state);
                        }
                    }
                }
                State::Dead => break,
            }

            if !self.sleep_and_live(&token).await {
                self.publish(EventKind::Aborted);
                break;
            }
        }

        self.table.note_actor_exited(phil);
    }

    /// Pauses for one turn delay (abortable), then applies hunger decay.
    ///
    /// Returns `false` when cancellation interrupted the pause.
    async fn sleep_and_live(&self, token: &CancellationToken) -> bool {
        if !self.delay.is_zero() {
            let sleep = time::sleep(self.delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return false,
            }
        } else {
            if token.is_cancelled() {
                return false;
            }
            // Zero delay: still yield so peers and listeners get scheduled.
            tokio::task::yield_now().await;
        }
        if let Some(state) = self.philosopher.decay() {
            self.table.publish_state_change(&self.philosopher, state);
        }
        true
    }

    fn die_of_hunger(&self) {
        let phil = &self.philosopher;
        let meals = phil.meals();
        if phil.starve().is_some() {
            self.table.note_death(phil);
        }
        self.table.bus().publish(
            Event::now(EventKind::Starved)
                .with_id(phil.id())
                .with_philosopher(phil.name_arc())
                .with_amount(meals),
        );
    }

    fn publish(&self, kind: EventKind) {
        let phil = &self.philosopher;
        self.table.bus().publish(
            Event::now(kind)
                .with_id(phil.id())
                .with_philosopher(phil.name_arc()),
        );
    }
}
