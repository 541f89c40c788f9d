//! Runtime core: registration, ordering and the boot/shutdown lifecycle.
//!
//! The public API from this module is [`Container`] (plus its builder,
//! configuration and [`Phase`]).
//!
//! Internal modules:
//! - [`registry`]: registered services, registration order and instance identity;
//! - [`graph`]: dependency graph built once per boot attempt;
//! - [`topo`]: deterministic topological order and cycle reporting;
//! - [`serializer`]: FIFO queue of boot/shutdown operations;
//! - [`boot`]: boot orchestrator (fast-abort, preemption, hooks);
//! - [`runner`]: one service boot call with timeout and stall reports;
//! - [`shutdown`]: reverse-order shutdown orchestrator;
//! - [`signal`]: cross-platform termination signal handling.

mod boot;
mod builder;
mod config;
mod container;
mod graph;
mod registry;
mod runner;
mod serializer;
mod shutdown;
mod signal;
mod state;
mod topo;

pub use builder::ContainerBuilder;
pub use config::{ContainerConfig, InvocationPolicy};
pub use container::Container;
pub use state::Phase;

use std::any::Any;

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
