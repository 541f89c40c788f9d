//! # Shutdown orchestrator.
//!
//! Stops booted services one at a time, last-booted first:
//!
//! ```text
//! phase BootCompleted → ShuttingDown
//!   booted = [A, B, C]   (completion order)
//!   pop C → ServiceStopping → C.shutdown().await → ServiceStopped
//!   pop B → ...
//!   pop A → ...
//! phase → Initial
//! ```
//!
//! ## Rules
//! - Only services whose boot succeeded are stopped
//! - There is no failure channel; a panicking shutdown is reported as
//!   `HookPanicked` and the next service is stopped anyway
//! - Outside `BootCompleted` the operation is a no-op

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::core::{Container, Phase, panic_info};
use crate::events::{Event, EventKind};
use crate::service::ServiceRef;

/// Runs a full shutdown pass.
pub(crate) async fn run(container: &Container) {
    let stopping: Vec<ServiceRef> = {
        let mut st = container.lock();
        if st.phase != Phase::BootCompleted {
            return;
        }
        st.phase = Phase::ShuttingDown;
        st.booted.iter().rev().map(|(_, s)| Arc::clone(s)).collect()
    };
    // Names come from service code, so they are read outside the lock.
    let stop_order: Vec<Arc<str>> = stopping.iter().map(|s| Arc::from(s.name())).collect();

    let bus = container.bus();
    bus.publish(Event::new(EventKind::ShutdownStarted).with_pending(stop_order));

    loop {
        let next = container.lock().booted.pop();
        let Some((_, service)) = next else { break };

        let name: Arc<str> = Arc::from(service.name());
        bus.publish(Event::new(EventKind::ServiceStopping).with_service(Arc::clone(&name)));

        if let Err(panic) = AssertUnwindSafe(service.shutdown()).catch_unwind().await {
            bus.publish(
                Event::new(EventKind::HookPanicked)
                    .with_service(Arc::clone(&name))
                    .with_reason(format!("shutdown: {}", panic_info(&*panic))),
            );
        }
        bus.publish(Event::new(EventKind::ServiceStopped).with_service(name));
    }

    container.lock().phase = Phase::Initial;
    bus.publish(Event::new(EventKind::ShutdownCompleted));
}
