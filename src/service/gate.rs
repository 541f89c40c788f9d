//! # Operation gate: in-flight operation accounting for services.
//!
//! A service that performs asynchronous work on behalf of callers can embed an
//! [`OperationGate`] to make its shutdown wait for that work:
//!
//! ```text
//! caller ──► gate.enter()? ──► OperationGuard ──► (work) ──► drop(guard)
//!                                                                │
//! Service::shutdown ──► gate.close_and_drain().await ◄───────────┘
//!                         (returns once in_flight == 0)
//! ```
//!
//! ## Rules
//! - After [`close`](OperationGate::close), new operations are rejected with
//!   [`ServiceError::NotActive`], **unless** another operation is still in
//!   flight (nested work started by a running operation may still enter).
//! - [`enter_forced`](OperationGate::enter_forced) ignores the closed state.
//! - `close_and_drain` returns immediately when nothing is in flight.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::error::ServiceError;

#[derive(Debug)]
struct GateState {
    in_flight: usize,
    open: bool,
}

/// Counts in-flight operations and lets shutdown wait for them to drain.
#[derive(Debug)]
pub struct OperationGate {
    state: Mutex<GateState>,
    drained: Notify,
}

impl OperationGate {
    /// Creates an open gate with nothing in flight.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                in_flight: 0,
                open: true,
            }),
            drained: Notify::new(),
        }
    }

    /// Starts an operation.
    ///
    /// Fails with [`ServiceError::NotActive`] if the gate is closed and no
    /// other operation is in flight.
    pub fn enter(&self) -> Result<OperationGuard<'_>, ServiceError> {
        let mut st = self.lock();
        if !st.open && st.in_flight == 0 {
            return Err(ServiceError::NotActive);
        }
        st.in_flight += 1;
        Ok(OperationGuard { gate: self })
    }

    /// Starts an operation regardless of the gate state.
    pub fn enter_forced(&self) -> OperationGuard<'_> {
        self.lock().in_flight += 1;
        OperationGuard { gate: self }
    }

    /// Stops admitting new operations.
    pub fn close(&self) {
        self.lock().open = false;
    }

    /// Admits operations again (e.g. after the service is booted once more).
    pub fn reopen(&self) {
        self.lock().open = true;
    }

    /// Closes the gate and waits until every in-flight operation finished.
    pub async fn close_and_drain(&self) {
        self.close();
        loop {
            let notified = self.drained.notified();
            if self.lock().in_flight == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Returns true if new operations are admitted.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    fn leave(&self) {
        let mut st = self.lock();
        st.in_flight = st.in_flight.saturating_sub(1);
        if st.in_flight == 0 {
            drop(st);
            self.drained.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OperationGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one in-flight operation; dropping it ends the operation.
#[must_use = "the operation ends when the guard is dropped"]
#[derive(Debug)]
pub struct OperationGuard<'a> {
    gate: &'a OperationGate,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
