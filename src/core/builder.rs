use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{Container, ContainerConfig},
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Container`] with optional subscribers.
pub struct ContainerBuilder {
    cfg: ContainerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ContainerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ContainerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (boot progress, failures, shutdown)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the container.
    ///
    /// Initializes the event bus and, if any subscribers were given, their
    /// workers and the bus listener feeding them. Those are spawned tasks, so
    /// building with subscribers must happen within a Tokio runtime; a
    /// container without subscribers can be built anywhere.
    pub fn build(self) -> Container {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let listener = (!self.subscribers.is_empty()).then(|| {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let close = CancellationToken::new();
            let handle = subscriber_listener(bus.subscribe(), set, close.clone());
            (close, handle)
        });
        Container::new_internal(self.cfg, bus, listener)
    }
}

/// Forwards bus events to the subscriber set until `close` fires.
///
/// A lagging listener skips what it missed and keeps going. On close, events
/// already buffered are still forwarded and every lane is drained.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    close: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Ok(ev) => set.emit_arc(Arc::new(ev)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                () = close.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit_arc(Arc::new(ev)),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}
