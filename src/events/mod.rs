//! Container events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the boot and shutdown pipelines
//! and by subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the boot/shutdown pipeline in `core`, `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: the subscriber listener (fans out to `SubscriberSet`),
//!   and the transient receivers behind `Container::ready` / `Container::wait_for`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
