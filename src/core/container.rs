//! # Container: registry, lifecycle state and operation queue behind one handle.
//!
//! The [`Container`] owns every piece of orchestrator state. It is a cheap
//! `Arc` handle: clones share the same registry, phase and event bus.
//!
//! ## High-level architecture
//! ```text
//! register / resolve ──► lock ──► State { phase, registry, pending, booted, ops }
//!
//! boot(ctx)  ──┐                             ┌──► boot::run      ──► Service::boot ...
//!              ├──► ops.admit ──► driver ────┤
//! shutdown() ──┘    (FIFO)       (one task)  └──► shutdown::run  ──► Service::shutdown ...
//!
//! every transition ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                           └──► ready() / wait_for() waiters
//! ```
//!
//! ## Rules
//! - The driver task is the single logical context that runs operations;
//!   it exists while the operation queue is non-empty
//! - `boot` and `shutdown` are admitted when called, not when first polled,
//!   so the queue preserves call order even if the returned futures are never awaited
//! - The state lock is never held across an `.await` or a call into service
//!   code, so services may call back into the container from any hook
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bootvisor::{Container, ContainerConfig, LaunchContext, Phase, Service, ServiceError, ServiceId};
//!
//! trait Db: Service {}
//! trait Api: Service {}
//!
//! struct Postgres;
//! #[async_trait]
//! impl Service for Postgres {}
//! impl Db for Postgres {}
//!
//! struct Http;
//! #[async_trait]
//! impl Service for Http {
//!     fn dependencies(&self, _: &Container) -> Vec<ServiceId> {
//!         vec![ServiceId::of::<dyn Db>()]
//!     }
//! }
//! impl Api for Http {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = Container::builder(ContainerConfig::default()).build();
//!     container.register::<dyn Api>(Arc::new(Http))?;
//!     container.register::<dyn Db>(Arc::new(Postgres))?;
//!
//!     container.boot(LaunchContext::new()).await?;
//!     assert_eq!(container.phase(), Phase::BootCompleted);
//!     assert!(container.is_booted::<dyn Api>());
//!
//!     container.shutdown().await;
//!     assert_eq!(container.phase(), Phase::Initial);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::serializer::Operation;
use crate::core::state::State;
use crate::core::{ContainerBuilder, ContainerConfig, Phase, boot, shutdown, signal};
use crate::error::{BootError, BootResult, ContainerError};
use crate::events::{Bus, Event, EventKind};
use crate::service::{LaunchContext, Service, ServiceId};

struct Inner {
    cfg: ContainerConfig,
    bus: Bus,
    state: Mutex<State>,
    /// Subscriber listener, present when the container was built with subscribers.
    listener: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

/// Service lifecycle orchestrator.
///
/// Lifecycle: `register* → boot → [shutdown → register* → boot]*`.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Returns a builder for a container with the given configuration.
    pub fn builder(cfg: ContainerConfig) -> ContainerBuilder {
        ContainerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: ContainerConfig,
        bus: Bus,
        listener: Option<(CancellationToken, JoinHandle<()>)>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                bus,
                state: Mutex::new(State::new()),
                listener: Mutex::new(listener),
            }),
        }
    }

    /// Locks the state. Critical sections never run service code, so a
    /// poisoned lock still guards consistent data.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Returns the configuration the container was built with.
    pub fn config(&self) -> &ContainerConfig {
        &self.inner.cfg
    }

    /// Creates a receiver for every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Registers `instance` under contract `C`.
    ///
    /// # Errors
    /// - [`ContainerError::AlreadyBooted`] outside [`Phase::Initial`]
    /// - [`ContainerError::DuplicateService`] if `C` is taken
    /// - [`ContainerError::DuplicateInstance`] if `instance` is registered under another contract
    pub fn register<C>(&self, instance: Arc<C>) -> Result<(), ContainerError>
    where
        C: ?Sized + Service,
    {
        let mut st = self.lock();
        if st.phase != Phase::Initial {
            return Err(ContainerError::AlreadyBooted);
        }
        st.registry.insert(instance).map(|_| ())
    }

    /// Returns the instance registered under contract `C`.
    ///
    /// # Errors
    /// - [`ContainerError::NotReadyYet`] while a boot is running and `C` has not finished booting
    /// - [`ContainerError::NotFound`] if nothing is registered under `C`
    pub fn resolve<C>(&self) -> Result<Arc<C>, ContainerError>
    where
        C: ?Sized + Service,
    {
        let id = ServiceId::of::<C>();
        let st = self.lock();
        if st.is_pending(&id) {
            return Err(ContainerError::NotReadyYet { service: id });
        }
        st.registry
            .get::<C>()
            .ok_or(ContainerError::NotFound { service: id })
    }

    /// Like [`resolve`](Container::resolve), but an unregistered contract is `Ok(None)`.
    ///
    /// `NotReadyYet` is still an error: it signals a dependency ordering bug.
    pub fn try_resolve<C>(&self) -> Result<Option<Arc<C>>, ContainerError>
    where
        C: ?Sized + Service,
    {
        match self.resolve::<C>() {
            Ok(service) => Ok(Some(service)),
            Err(ContainerError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns true if `C` finished booting and has not been shut down since.
    pub fn is_booted<C>(&self) -> bool
    where
        C: ?Sized + Service,
    {
        self.lock().is_booted(&ServiceId::of::<C>())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Requests a boot attempt.
    ///
    /// The request is queued immediately; the returned future resolves with
    /// the aggregate result once the attempt (and everything queued before
    /// it) has run. Must be called within a Tokio runtime.
    ///
    /// Fails with [`BootError::AlreadyBooted`] unless the container is in
    /// [`Phase::Initial`] when the attempt starts.
    pub fn boot(&self, ctx: LaunchContext) -> impl Future<Output = BootResult> + Send + use<> {
        let (done, rx) = oneshot::channel();
        self.admit(
            Operation::Boot { ctx, done },
            Event::new(EventKind::BootRequested),
        );
        async move { rx.await.unwrap_or(Err(BootError::Interrupted)) }
    }

    /// Requests a shutdown of every booted service.
    ///
    /// Queued like [`boot`](Container::boot). A shutdown queued while a boot
    /// is running cancels the rest of that boot, then stops what did boot.
    pub fn shutdown(&self) -> impl Future<Output = ()> + Send + use<> {
        self.request_shutdown(None)
    }

    fn request_shutdown(
        &self,
        reason: Option<&'static str>,
    ) -> impl Future<Output = ()> + Send + use<> {
        let mut requested = Event::new(EventKind::ShutdownRequested);
        if let Some(reason) = reason {
            requested = requested.with_reason(reason);
        }
        let (done, rx) = oneshot::channel();
        self.admit(Operation::Shutdown { done }, requested);
        async move {
            let _ = rx.await;
        }
    }

    /// Waits until a boot attempt finishes.
    ///
    /// Returns immediately if the container is in [`Phase::BootCompleted`].
    /// An attempt that finishes after the call wakes the waiter even if a
    /// queued shutdown has already moved the container on. The boot may have
    /// failed; `ready` only waits for it to finish.
    pub async fn ready(&self) {
        let mut rx = self.inner.bus.subscribe();
        let seen = self.lock().attempts_completed;
        loop {
            {
                let st = self.lock();
                if st.phase == Phase::BootCompleted || st.attempts_completed > seen {
                    return;
                }
            }
            if let Err(broadcast::error::RecvError::Closed) = rx.recv().await {
                return;
            }
        }
    }

    /// Waits until `C` has booted and returns it.
    ///
    /// Returns immediately if `C` is already booted. A boot of `C` that
    /// completes after the call wakes the waiter even if `C` was stopped again
    /// before the waiter ran. Keeps waiting across failed attempts until a
    /// later boot brings `C` up.
    ///
    /// # Errors
    /// [`ContainerError::NotFound`] if nothing is registered under `C`.
    pub async fn wait_for<C>(&self) -> Result<Arc<C>, ContainerError>
    where
        C: ?Sized + Service,
    {
        let id = ServiceId::of::<C>();
        let mut rx = self.inner.bus.subscribe();
        let seen = self.lock().boot_count(&id);
        loop {
            {
                let st = self.lock();
                if !st.registry.contains(&id) {
                    return Err(ContainerError::NotFound { service: id });
                }
                if st.is_booted(&id) || st.boot_count(&id) > seen {
                    if let Some(service) = st.registry.get::<C>() {
                        return Ok(service);
                    }
                }
            }
            loop {
                match rx.recv().await {
                    Ok(ev) if ev.is_boot_progress() => break,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(ContainerError::NotFound { service: id });
                    }
                }
            }
        }
    }

    /// Boots, runs until a termination signal or `token` cancellation, then shuts down.
    ///
    /// A failed boot stops whatever did boot and returns the failure right away.
    /// The cause of the shutdown is attached to the `ShutdownRequested` event.
    /// If signal handlers cannot be installed, only `token` ends the run.
    pub async fn serve(&self, ctx: LaunchContext, token: CancellationToken) -> BootResult {
        let result = self.boot(ctx).await;
        let reason = if result.is_err() {
            "boot failed"
        } else {
            tokio::select! {
                _ = token.cancelled() => "token canceled",
                received = signal::wait_for_termination() => match received {
                    Ok(name) => name,
                    Err(_) => {
                        token.cancelled().await;
                        "token canceled"
                    }
                },
            }
        };
        self.request_shutdown(Some(reason)).await;
        self.close_subscribers().await;
        result
    }

    /// Hands every event published so far to the subscribers and waits until
    /// they have processed it, then stops their workers.
    ///
    /// Later events only reach [`subscribe`](Container::subscribe) receivers.
    /// [`serve`](Container::serve) calls this on its way out. Does nothing
    /// without subscribers or on a second call.
    pub async fn close_subscribers(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((close, handle)) = listener {
            close.cancel();
            let _ = handle.await;
        }
    }

    /// Queues `op` and starts a driver if none is running.
    fn admit(&self, op: Operation, requested: Event) {
        let start = self.lock().ops.admit(op);
        self.inner.bus.publish(requested);
        if start {
            let driver = self.clone();
            tokio::spawn(driver.drive());
        }
    }

    /// Runs queued operations in FIFO order until the queue is empty.
    async fn drive(self) {
        loop {
            let op = self.lock().ops.next();
            let Some(op) = op else { break };

            match op {
                Operation::Boot { ctx, done } => {
                    let _ = done.send(boot::run(&self, ctx).await);
                }
                Operation::Shutdown { done } => {
                    shutdown::run(&self).await;
                    let _ = done.send(());
                }
            }
        }
    }
}
