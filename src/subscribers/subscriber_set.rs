//! # Event fan-out to subscribers.
//!
//! Every subscriber gets a *lane*: a bounded queue drained by its own worker
//! task. The container's listener pushes each bus event into every lane and
//! moves on, so a slow subscriber can only ever delay itself.
//!
//! ```text
//! Bus ──► listener ──► SubscriberSet::emit_arc
//!                          ├──► lane "log"     [queue] ──► worker ──► on_event
//!                          ├──► lane "metrics" [queue] ──► worker ──► on_event
//!                          └──► lane "audit"   [queue] ──► worker ──► on_event
//!                                                             └─ panic ──► SubscriberPanicked
//! ```
//!
//! ## Rules
//! - A lane delivers in publish order; lanes are not ordered relative to each other
//! - A full or closed lane drops the event for that subscriber only and publishes
//!   `SubscriberOverflow` (never for an overflow event itself)
//! - A panicking `on_event` is reported as `SubscriberPanicked`; the worker keeps going

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::panic_info;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Queue and worker of one subscriber.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    worker: JoinHandle<()>,
}

impl Lane {
    fn spawn(sub: Arc<dyn Subscribe>, bus: Bus) -> Self {
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

        let worker = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let delivered = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
                if let Err(panic) = delivered {
                    bus.publish(Event::subscriber_panicked(name, panic_info(&*panic)));
                }
            }
        });
        Self { name, tx, worker }
    }

    /// Queues `ev` without waiting; returns the drop reason on failure.
    fn offer(&self, ev: &Arc<Event>) -> Result<(), &'static str> {
        match self.tx.try_send(Arc::clone(ev)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err("full"),
            Err(mpsc::error::TrySendError::Closed(_)) => Err("closed"),
        }
    }
}

/// Per-subscriber delivery lanes for container events.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one lane per subscriber.
    ///
    /// Must be called within a Tokio runtime when `subs` is non-empty.
    /// Panics and overflows are reported on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let lanes = subs
            .into_iter()
            .map(|sub| Lane::spawn(sub, bus.clone()))
            .collect();
        Self { lanes, bus }
    }

    /// Delivers a shared event to every lane without blocking.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let report = event.kind != EventKind::SubscriberOverflow;
        for lane in &self.lanes {
            if let Err(reason) = lane.offer(&event) {
                if report {
                    self.bus
                        .publish(Event::subscriber_overflow(lane.name, reason));
                }
            }
        }
    }

    /// Closes every lane and waits for the workers to drain their queues.
    pub async fn shutdown(self) {
        let mut workers = Vec::with_capacity(self.lanes.len());
        for lane in self.lanes {
            drop(lane.tx);
            workers.push(lane.worker);
        }
        for worker in workers {
            let _ = worker.await;
        }
    }
}
