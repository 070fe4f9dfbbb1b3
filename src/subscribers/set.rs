//! Non-blocking fan-out of simulation events to subscribers.
//!
//! [`SubscriberSet`] gives every subscriber its own bounded lane (queue +
//! worker task), so one slow or panicking display binding cannot stall
//! the philosophers or its peers:
//!
//! ```text
//!    Bus ─► forward(rx) ─► emit(&Event)
//!                              ├──► [lane 1] ─► worker ─► on_event()
//!                              ├──► [lane 2] ─► worker ─► on_event()
//!                              └──► [lane N] ─► worker ─► on_event()
//! ```
//!
//! Guarantees: `emit` never blocks; per-subscriber FIFO; a panic inside
//! `on_event` is caught and logged. Not guaranteed: ordering across
//! subscribers (use `Event::seq`) and delivery when a lane overflows
//! (the event is dropped for that subscriber only, and counted).
//!
//! The set is torn down by [`forward`](SubscriberSet::forward) once the
//! event bus closes, or explicitly via
//! [`shutdown`](SubscriberSet::shutdown); queued events are still
//! delivered before the workers exit.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::FutureExt;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

use crate::events::Event;

use super::Subscribe;

/// One subscriber's queue plus overflow accounting.
struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
}

impl Lane {
    /// Spawns the worker draining this lane.
    ///
    /// The worker survives subscriber panics: the event is lost for that
    /// subscriber, the lane keeps draining.
    fn spawn(sub: Arc<dyn Subscribe>) -> (Self, JoinHandle<()>) {
        let name = sub.name();
        let (queue, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

        let worker = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let delivery = std::panic::AssertUnwindSafe(sub.on_event(&ev));
                if delivery.catch_unwind().await.is_err() {
                    eprintln!("[symposium] subscriber '{}' panicked on {:?}", name, ev.kind);
                }
            }
        });

        (
            Lane {
                name,
                queue,
                dropped: AtomicU64::new(0),
            },
            worker,
        )
    }

    fn push(&self, ev: Arc<Event>) {
        if self.queue.try_send(ev).is_err() {
            // Full lane or a worker that already exited; same outcome.
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            eprintln!(
                "[symposium] subscriber '{}' dropped an event ({} so far)",
                self.name, total
            );
        }
    }
}

/// Fan-out stage between the event bus and [`Subscribe`] implementations.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates one lane and worker per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());
        for sub in subs {
            let (lane, worker) = Lane::spawn(sub);
            lanes.push(lane);
            workers.push(worker);
        }
        Self { lanes, workers }
    }

    /// Fans one event out to every lane without blocking.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            lane.push(Arc::clone(&ev));
        }
    }

    /// Drives the set from a bus receiver until the bus closes, then
    /// shuts the lanes down.
    ///
    /// This is the whole lifetime of a fan-out stage: when the last bus
    /// sender is dropped the loop ends, queued events drain, and every
    /// worker exits. A lagged receiver skips the overwritten events and
    /// keeps going.
    pub async fn forward(self, mut rx: broadcast::Receiver<Event>) {
        loop {
            match rx.recv().await {
                Ok(ev) => self.emit(&ev),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    eprintln!("[symposium] event fan-out lagged, skipped {skipped}");
                }
            }
        }
        self.shutdown().await;
    }

    /// Closes every lane and waits for the workers to drain and exit.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
