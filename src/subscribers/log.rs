//! # LogWriter
//!
//! Prints one line per container [`Event`] to stdout. Meant for demos and
//! local debugging.
//!
//! ## Example output
//! ```text
//! [boot-requested]
//! [boot-started] services=["db", "cache"]
//! [booting] service="db" position=1
//! [booted] service="db" position=1
//! [failed] service="cache" position=2 err="boot failed: connection refused"
//! [boot-completed] err="'cache' failed with: boot failed: connection refused"
//! [stopping] service="db"
//! [stopped] service="db"
//! [shutdown-completed]
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Stdout subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("unknown");
        let pending: Vec<&str> = e.pending.iter().flat_map(|p| p.iter()).map(|s| &**s).collect();

        match e.kind {
            EventKind::BootRequested => println!("[boot-requested]"),
            EventKind::BootStarted => println!("[boot-started] services={pending:?}"),
            EventKind::ServiceBooting => {
                println!("[booting] service={service:?} position={:?}", e.position);
            }
            EventKind::ServiceBooted => {
                println!("[booted] service={service:?} position={:?}", e.position);
            }
            EventKind::ServiceFailed => {
                println!(
                    "[failed] service={service:?} position={:?} err={:?}",
                    e.position, e.reason
                );
            }
            EventKind::BootCanceled => {
                println!("[boot-canceled] next={service:?} skipped={pending:?}");
            }
            EventKind::BootStalled => {
                println!(
                    "[still-booting] service={service:?} elapsed_ms={:?} pending={pending:?}",
                    e.elapsed_ms
                );
            }
            EventKind::BootCompleted => match &e.reason {
                Some(err) => println!("[boot-completed] err={err:?}"),
                None => println!("[boot-completed]"),
            },
            EventKind::ShutdownRequested => match &e.reason {
                Some(cause) => println!("[shutdown-requested] cause={cause:?}"),
                None => println!("[shutdown-requested]"),
            },
            EventKind::ShutdownStarted => println!("[shutdown-started] services={pending:?}"),
            EventKind::ServiceStopping => println!("[stopping] service={service:?}"),
            EventKind::ServiceStopped => println!("[stopped] service={service:?}"),
            EventKind::ShutdownCompleted => println!("[shutdown-completed]"),
            EventKind::HookPanicked => {
                println!("[hook-panicked] service={service:?} info={:?}", e.reason);
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                let what = if e.kind == EventKind::SubscriberOverflow {
                    "dropped-event"
                } else {
                    "panicked"
                };
                println!("[subscriber-{what}] name={service:?} detail={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
