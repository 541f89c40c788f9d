//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the container to deliver [`Event`](crate::Event)s
//! broadcast through the bus.
//!
//! ## Architecture
//! ```text
//! boot/shutdown pipeline ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                            │
//!                                                      SubscriberSet::emit_arc
//!                                               ┌────────────┼────────────┐
//!                                               ▼            ▼            ▼
//!                                           LogWriter     Metrics      Custom
//! ```
//!
//! ## Optional
//! - `logging` feature: exports [`LogWriter`], a stdout printer (demo/reference only).

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
