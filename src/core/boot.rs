//! # Boot orchestrator.
//!
//! Runs one boot attempt on the driver task:
//!
//! ```text
//! phase Initial → Booting
//!   ├─► on_boot_began()        (every service)
//!   ├─► graph::build           (dependencies() of every service)
//!   ├─► topo::sort             (boot order)
//!   ├─► for each id in order:
//!   │     competing op queued? ──► Canceled(id, skipped rest)     ── stop
//!   │     runner::boot_one     ──► Err  → ServiceFailed(id, err)  ── stop
//!   │                          ──► Ok   → booted.push(id)
//! phase → BootCompleted
//!   └─► on_boot_completed(&result)  (every service)
//! ```
//!
//! ## Rules
//! - Services are booted one at a time; nothing ordered after a failure is invoked
//! - At most one failure is reported per attempt
//! - Hooks run on every registered service, booted or not
//! - The state lock is released before any service code runs

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::core::registry::Registered;
use crate::core::{Container, InvocationPolicy, Phase, graph, panic_info, runner, topo};
use crate::error::{BootError, BootResult};
use crate::events::{Bus, Event, EventKind};
use crate::service::{LaunchContext, Service, ServiceId, ServiceRef};

/// Runs a full boot attempt and returns its aggregate result.
pub(crate) async fn run(container: &Container, ctx: LaunchContext) -> BootResult {
    let services = {
        let mut st = container.lock();
        if st.phase != Phase::Initial {
            return Err(BootError::AlreadyBooted);
        }
        let services = st.registry.snapshot();
        st.phase = Phase::Booting;
        st.pending = services.iter().map(|s| s.id).collect();
        services
    };

    let bus = container.bus();
    bus.publish(
        Event::new(EventKind::BootStarted)
            .with_pending(services.iter().map(|s| Arc::<str>::from(s.service.name()))),
    );
    for s in &services {
        call_hook(bus, &*s.service, "on_boot_began", || s.service.on_boot_began());
    }

    let result = boot_in_order(container, &services, &ctx).await;

    {
        let mut st = container.lock();
        st.phase = Phase::BootCompleted;
        st.pending.clear();
        st.attempts_completed += 1;
    }

    let mut done = Event::new(EventKind::BootCompleted);
    if let Err(e) = &result {
        done = done.with_reason(e.to_string());
    }
    bus.publish(done);

    for s in &services {
        call_hook(bus, &*s.service, "on_boot_completed", || {
            s.service.on_boot_completed(&result)
        });
    }
    result
}

/// Orders the services and boots them; fast-aborts on the first failure.
async fn boot_in_order(
    container: &Container,
    services: &[Registered],
    ctx: &LaunchContext,
) -> BootResult {
    let graph = graph::build(container, services)?;
    let order = topo::sort(&graph)?;

    let by_id: HashMap<ServiceId, &ServiceRef> =
        services.iter().map(|s| (s.id, &s.service)).collect();
    let plan: Vec<(ServiceId, ServiceRef)> = order
        .iter()
        .filter_map(|id| by_id.get(id).map(|s| (*id, Arc::clone(s))))
        .collect();
    let names: Vec<Arc<str>> = plan.iter().map(|(_, s)| Arc::from(s.name())).collect();

    container.lock().pending = order.iter().copied().collect();

    let cfg = container.config();
    let bus = container.bus();
    for (i, (id, service)) in plan.iter().enumerate() {
        let position = i + 1;

        if cfg.invocation == InvocationPolicy::Deferred {
            tokio::task::yield_now().await;
        }

        let competing = {
            let mut st = container.lock();
            let competing = st.ops.has_competing();
            if competing {
                st.pending.clear();
            }
            competing
        };
        if competing {
            bus.publish(
                Event::new(EventKind::BootCanceled)
                    .with_service(Arc::clone(&names[i]))
                    .with_pending(names[i + 1..].iter().cloned()),
            );
            return Err(BootError::Canceled {
                service: *id,
                skipped: plan[i + 1..].iter().map(|(id, _)| *id).collect(),
            });
        }

        match runner::boot_one(&**service, ctx, position, &names[i..], cfg, bus).await {
            Ok(()) => {
                container.lock().mark_booted(*id, Arc::clone(service));
                bus.publish(
                    Event::new(EventKind::ServiceBooted)
                        .with_service(Arc::clone(&names[i]))
                        .with_position(position),
                );
            }
            Err(error) => {
                container.lock().pending.clear();
                bus.publish(
                    Event::new(EventKind::ServiceFailed)
                        .with_service(Arc::clone(&names[i]))
                        .with_position(position)
                        .with_reason(error.to_string()),
                );
                return Err(BootError::ServiceFailed {
                    service: *id,
                    error,
                });
            }
        }
    }
    Ok(())
}

/// Runs a synchronous hook; a panic is reported and swallowed.
fn call_hook(bus: &Bus, service: &dyn Service, hook: &str, f: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
        bus.publish(
            Event::new(EventKind::HookPanicked)
                .with_service(service.name())
                .with_reason(format!("{hook}: {}", panic_info(&*panic))),
        );
    }
}
