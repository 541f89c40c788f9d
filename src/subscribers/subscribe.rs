//! # Subscriber trait.
//!
//! Implement [`Subscribe`] to observe container events: logging, metrics,
//! audit trails. Each subscriber is fed from its own bounded queue, so a slow
//! `on_event` never holds up a boot or another subscriber; it only risks
//! losing events once its queue is full.
//!
//! ## Example
//! ```rust
//! use bootvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureAlarm;
//!
//! #[async_trait]
//! impl Subscribe for FailureAlarm {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ServiceFailed {
//!             eprintln!("{:?} failed: {:?}", ev.service, ev.reason);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-alarm" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of container events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in `SubscriberOverflow` / `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events that may wait in this subscriber's queue before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
