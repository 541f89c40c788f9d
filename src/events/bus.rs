//! # Event bus.
//!
//! Boot and shutdown pipelines, subscriber workers and waiters all talk over
//! one [`tokio::sync::broadcast`] channel. Publishing never waits: if nobody
//! listens the event is gone, and a receiver that falls behind the ring buffer
//! sees `Lagged` and resumes from the oldest retained event.
//!
//! ```text
//! boot::run ───────┐                ┌──► subscriber_listener ──► SubscriberSet
//! shutdown::run ───┼──► Bus ────────┤
//! SubscriberSet ───┘                └──► ready() / wait_for() (short-lived receivers)
//! ```

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing handle for container events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to the current receivers, if any.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
