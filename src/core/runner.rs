//! # Run a single service boot call.
//!
//! Executes one [`Service::boot`] with optional timeout and panic isolation,
//! and reports progress to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! publish ServiceBooting
//!     │
//!     ▼
//! service.boot(ctx) ──► Ok(())              → Ok
//!     │             ──► Err(e)              → Err(e)
//!     │             ──► panic               → Err(Panicked)
//!     │             ──► timeout exceeded    → Err(Timeout)   (boot future dropped)
//!     │
//!     └── every `stall_report` while in flight → publish BootStalled
//! ```
//!
//! ## Rules
//! - Publishes `ServiceBooting` exactly once per call
//! - Terminal events (`ServiceBooted` / `ServiceFailed`) are published by the
//!   caller, after the container state reflects the outcome
//! - An expired timeout drops the boot future; the service sees no further polls

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::{ContainerConfig, panic_info};
use crate::error::ServiceError;
use crate::events::{Bus, Event, EventKind};
use crate::service::{LaunchContext, Service};

/// Boots `service`, which sits at 1-based `position` of the boot order.
///
/// `pending` lists the names of every service that has not booted yet,
/// starting with this one; it is attached to `BootStalled` reports.
pub(crate) async fn boot_one(
    service: &dyn Service,
    ctx: &LaunchContext,
    position: usize,
    pending: &[Arc<str>],
    cfg: &ContainerConfig,
    bus: &Bus,
) -> Result<(), ServiceError> {
    let name = service.name();
    bus.publish(
        Event::new(EventKind::ServiceBooting)
            .with_service(name)
            .with_position(position),
    );

    let call = async {
        match AssertUnwindSafe(service.boot(ctx)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(ServiceError::Panicked {
                info: panic_info(&*panic),
            }),
        }
    };

    let bounded = async {
        match cfg.boot_timeout() {
            Some(dur) => time::timeout(dur, call)
                .await
                .unwrap_or(Err(ServiceError::Timeout { timeout: dur })),
            None => call.await,
        }
    };

    match cfg.stall_report() {
        Some(every) => report_stalls(bounded, name, pending, every, bus).await,
        None => bounded.await,
    }
}

/// Drives `fut` to completion, publishing `BootStalled` every `every`.
async fn report_stalls<F, T>(fut: F, name: &str, pending: &[Arc<str>], every: Duration, bus: &Bus) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let mut ticker = time::interval_at(started + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            out = &mut fut => return out,
            _ = ticker.tick() => {
                bus.publish(
                    Event::new(EventKind::BootStalled)
                        .with_service(name)
                        .with_elapsed(started.elapsed())
                        .with_pending(pending.iter().cloned()),
                );
            }
        }
    }
}
