//! Stdout logging subscriber for demos and debugging.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Renders simulation events to stdout in a human-readable form.
///
/// ```text
/// Bjarne is thinking about life and space.
/// Bjarne got rice
/// Bjarne is eating rice, amount 4
/// [blocked] Bjarne beside Terje is eating.
/// Terje panicks since there is no food available.
/// Terje has died of starvation, but ate 2 times.
/// [stop-requested]
/// ```
///
/// Intended for development and the demo driver; implement your own
/// [`Subscribe`] for structured output or display binding.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let who = e.philosopher.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::Thinking => {
                println!("{who} is thinking about life and space.");
            }
            EventKind::StateChanged => {
                if let Some(state) = e.state {
                    println!("[state] {who} is now {state}");
                }
            }
            EventKind::FoodServed => {
                if let Some(food) = &e.food {
                    println!("{who} got {food}");
                }
            }
            EventKind::Ate => {
                if let (Some(food), Some(amount)) = (&e.food, e.amount) {
                    println!("{who} is eating {food}, amount {amount}");
                }
            }
            EventKind::RequestBlocked => {
                if let Some(reason) = &e.reason {
                    eprintln!("[blocked] {reason}");
                }
            }
            EventKind::RequestYielded => {
                if let Some(reason) = &e.reason {
                    println!("[yield] {who} waits for {reason}");
                }
            }
            EventKind::NoFoodAvailable => {
                println!("{who} panicks since there is no food available.");
            }
            EventKind::Starved => {
                let meals = e.amount.unwrap_or(0);
                eprintln!("{who} has died of starvation, but ate {meals} times.");
            }
            EventKind::Aborted => {
                println!("{who} aborted.");
            }
            EventKind::StopRequested => {
                println!("[stop-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                eprintln!("[grace-exceeded]");
            }
            EventKind::ActorStarted | EventKind::ActorExited => {}
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
