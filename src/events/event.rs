//! # Container events.
//!
//! Everything the container does is reported as an [`Event`] on the bus.
//! [`EventKind`] groups them into boot progress, shutdown progress and
//! subscriber delivery problems; the optional fields of [`Event`] carry the
//! service name, failure reason, boot position, timing and the names still
//! waiting.
//!
//! `seq` comes from a process-wide counter. Subscribers running on separate
//! workers can sort by it to recover publish order.
//!
//! ## Example
//! ```rust
//! use bootvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceFailed)
//!     .with_service("db")
//!     .with_reason("boom")
//!     .with_position(3);
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("db"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of container events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Boot events ===
    /// Boot was admitted to the operation queue.
    BootRequested,

    /// A boot attempt started (phase is now `Booting`).
    ///
    /// Sets:
    /// - `pending`: registered services, in registration order
    BootStarted,

    /// A service's boot call is about to be invoked.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `position`: 1-based position in the boot order
    ServiceBooting,

    /// A service finished booting successfully.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `position`: 1-based position in the boot order
    ServiceBooted,

    /// A service reported a boot failure; the attempt is aborted.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `position`: 1-based position in the boot order
    /// - `reason`: failure message
    ServiceFailed,

    /// The attempt was canceled because a competing operation was queued.
    ///
    /// Sets:
    /// - `service`: next-in-line service that was not invoked
    /// - `pending`: services skipped after it
    BootCanceled,

    /// A service boot is still in flight after the stall report interval.
    ///
    /// Sets:
    /// - `service`: service currently booting
    /// - `pending`: services not yet booted, in boot order
    /// - `elapsed_ms`: time spent in the current boot call
    BootStalled,

    /// The boot attempt finished (phase is now `BootCompleted`).
    ///
    /// Sets:
    /// - `reason`: failure description (absent on success)
    BootCompleted,

    // === Shutdown events ===
    /// Shutdown was admitted to the operation queue.
    ///
    /// Sets:
    /// - `reason`: what ended `Container::serve` (signal name, "token canceled",
    ///   "boot failed"); absent for a plain `shutdown()` call
    ShutdownRequested,

    /// Shutdown started (phase is now `ShuttingDown`).
    ///
    /// Sets:
    /// - `pending`: booted services, in stop order
    ShutdownStarted,

    /// A service's shutdown call is about to be invoked.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStopping,

    /// A service finished its shutdown.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStopped,

    /// Shutdown finished (phase is back to `Initial`).
    ShutdownCompleted,

    /// A lifecycle hook or shutdown call panicked; the pipeline continued.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: panic info/message
    HookPanicked,

    // === Delivery ===
    /// A subscriber's `on_event` panicked; its worker keeps running.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: panic payload
    SubscriberPanicked,

    /// An event was not queued for a subscriber.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: `full` or `closed`
    SubscriberOverflow,
}

/// One container event. Which optional fields are filled depends on `kind`.
#[derive(Clone, Debug)]
pub struct Event {
    /// Position in the process-wide publish order.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Name of the service (or subscriber), if applicable.
    pub service: Option<Arc<str>>,
    /// Failure message, panic payload or shutdown cause.
    pub reason: Option<Arc<str>>,
    /// 1-based position in the boot order.
    pub position: Option<u32>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Service names still waiting (boot) or about to be stopped (shutdown).
    pub pending: Option<Arc<[Arc<str>]>>,
}

impl Event {
    /// Stamps a new event of `kind` with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            reason: None,
            position: None,
            elapsed_ms: None,
            pending: None,
        }
    }

    /// Sets `reason`.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a 1-based boot order position.
    #[inline]
    pub fn with_position(mut self, n: usize) -> Self {
        self.position = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a list of pending service names.
    #[inline]
    pub fn with_pending<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.pending = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the `SubscriberOverflow` report for `subscriber`.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(reason)
    }

    /// Builds the `SubscriberPanicked` report for `subscriber`.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }

    /// Returns true for boot-pipeline events that change which services are booted.
    #[inline]
    pub fn is_boot_progress(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ServiceBooted | EventKind::BootCompleted | EventKind::ShutdownCompleted
        )
    }
}
