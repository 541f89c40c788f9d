//! # Container state.
//!
//! Everything mutable about a container lives in one [`State`] guarded by one
//! mutex. The lock is held only for short, synchronous sections: it is never
//! held across an `.await` or while service code runs.
//!
//! ## Phases
//! ```text
//!            boot                 boot finished            shutdown
//! Initial ──────────► Booting ────────────────► BootCompleted ──────────► ShuttingDown
//!    ▲                                                                        │
//!    └────────────────────────────────────────────────────────────────────────┘
//!                                 shutdown finished
//! ```
//!
//! ## Rules
//! - `pending` is non-empty only while `phase == Booting`
//! - `booted` holds services in boot-completion order; shutdown drains it from the back
//! - Registration is accepted only in `Initial`
//! - `attempts_completed` and `boot_counts` only grow; waiters compare them
//!   against a snapshot so a completion is seen even if shutdown already undid it

use std::collections::{HashMap, VecDeque};

use crate::core::registry::Registry;
use crate::core::serializer::OperationQueue;
use crate::service::{ServiceId, ServiceRef};

/// Lifecycle phase of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Accepting registrations; no boot has run since construction or the last shutdown.
    #[default]
    Initial,
    /// A boot attempt is in progress.
    Booting,
    /// The last boot attempt finished, successfully or not.
    BootCompleted,
    /// Booted services are being stopped.
    ShuttingDown,
}

impl Phase {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Booting => "booting",
            Phase::BootCompleted => "boot_completed",
            Phase::ShuttingDown => "shutting_down",
        }
    }
}

pub(crate) struct State {
    pub phase: Phase,
    pub registry: Registry,
    /// Services of the running attempt that have not finished booting, in boot order.
    pub pending: VecDeque<ServiceId>,
    /// Successfully booted services, in completion order.
    pub booted: Vec<(ServiceId, ServiceRef)>,
    pub ops: OperationQueue,
    /// Finished boot attempts since construction.
    pub attempts_completed: u64,
    /// Successful boots per service since construction.
    pub boot_counts: HashMap<ServiceId, u64>,
}

impl State {
    pub fn new() -> Self {
        Self {
            phase: Phase::Initial,
            registry: Registry::new(),
            pending: VecDeque::new(),
            booted: Vec::new(),
            ops: OperationQueue::new(),
            attempts_completed: 0,
            boot_counts: HashMap::new(),
        }
    }

    /// True if `id` belongs to the running attempt and has not booted yet.
    pub fn is_pending(&self, id: &ServiceId) -> bool {
        self.phase == Phase::Booting && self.pending.contains(id)
    }

    pub fn is_booted(&self, id: &ServiceId) -> bool {
        self.booted.iter().any(|(b, _)| b == id)
    }

    pub fn boot_count(&self, id: &ServiceId) -> u64 {
        self.boot_counts.get(id).copied().unwrap_or(0)
    }

    /// Appends a freshly booted service and bumps its boot count.
    pub fn mark_booted(&mut self, id: ServiceId, service: ServiceRef) {
        self.pending.pop_front();
        *self.boot_counts.entry(id).or_insert(0) += 1;
        self.booted.push((id, service));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct Unit;

    #[async_trait::async_trait]
    impl crate::service::Service for Unit {}

    #[test]
    fn pending_only_counts_while_booting() {
        let mut state = State::new();
        state.pending.push_back(ServiceId::of::<A>());
        assert!(!state.is_pending(&ServiceId::of::<A>()));

        state.phase = Phase::Booting;
        assert!(state.is_pending(&ServiceId::of::<A>()));
    }

    #[test]
    fn boot_counts_survive_shutdown() {
        let mut state = State::new();
        let id = ServiceId::of::<A>();
        state.pending.push_back(id);
        let service: ServiceRef = std::sync::Arc::new(Unit);
        state.mark_booted(id, service);
        assert!(state.pending.is_empty());
        assert!(state.is_booted(&id));

        state.booted.clear();
        assert!(!state.is_booted(&id));
        assert_eq!(state.boot_count(&id), 1);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Phase::default().as_label(), "initial");
        assert_eq!(Phase::ShuttingDown.as_label(), "shutting_down");
    }
}
