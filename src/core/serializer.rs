//! # Operation serializer.
//!
//! Boot and shutdown requests are admitted into one FIFO queue; at most one
//! runs at a time, and each finished operation triggers the next one.
//!
//! ```text
//! boot()     ──► admit ──┐
//! shutdown() ──► admit ──┼──► [ queue (FIFO) ] ──► driver ──► boot::run / shutdown::run
//! boot()     ──► admit ──┘                           │
//!                                                    └──► next() until empty
//! ```
//!
//! ## Rules
//! - Admission order is call order (admission happens synchronously inside
//!   `Container::boot` / `Container::shutdown`)
//! - Exactly one driver exists while the queue is non-empty
//! - A non-empty queue during a boot is the "competing operation" that
//!   preempts it (see `boot::run`)

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::error::BootResult;
use crate::service::LaunchContext;

/// A queued container operation and its completion channel.
pub(crate) enum Operation {
    Boot {
        ctx: LaunchContext,
        done: oneshot::Sender<BootResult>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// FIFO of pending operations plus the "driver running" flag.
#[derive(Default)]
pub(crate) struct OperationQueue {
    queue: VecDeque<Operation>,
    running: bool,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `op`. Returns `true` if the caller must start a driver.
    pub fn admit(&mut self, op: Operation) -> bool {
        self.queue.push_back(op);
        if self.running {
            false
        } else {
            self.running = true;
            true
        }
    }

    /// Dequeues the next operation; `None` releases the driver slot.
    pub fn next(&mut self) -> Option<Operation> {
        let op = self.queue.pop_front();
        if op.is_none() {
            self.running = false;
        }
        op
    }

    /// Returns true if an operation is waiting behind the running one.
    pub fn has_competing(&self) -> bool {
        !self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shutdown_op() -> (Operation, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Operation::Shutdown { done: tx }, rx)
    }

    fn boot_op() -> (Operation, oneshot::Receiver<BootResult>) {
        let (tx, rx) = oneshot::channel();
        (
            Operation::Boot {
                ctx: LaunchContext::new(),
                done: tx,
            },
            rx,
        )
    }

    #[test]
    fn only_first_admission_starts_a_driver() {
        let mut q = OperationQueue::new();
        assert!(q.admit(boot_op().0));
        assert!(!q.admit(shutdown_op().0));
        assert!(!q.admit(boot_op().0));
    }

    #[test]
    fn dequeues_in_admission_order() {
        let mut q = OperationQueue::new();
        q.admit(boot_op().0);
        q.admit(shutdown_op().0);

        assert!(matches!(q.next(), Some(Operation::Boot { .. })));
        assert!(!q.has_competing());
        assert!(matches!(q.next(), Some(Operation::Shutdown { .. })));
        assert!(q.next().is_none());
    }

    #[test]
    fn drained_queue_releases_the_driver() {
        let mut q = OperationQueue::new();
        assert!(q.admit(shutdown_op().0));
        assert!(q.next().is_some());
        assert!(q.next().is_none());
        assert!(q.admit(shutdown_op().0), "next admission starts a new driver");
    }

    #[test]
    fn queued_operation_counts_as_competing() {
        let mut q = OperationQueue::new();
        q.admit(boot_op().0);
        let _running = q.next();
        assert!(!q.has_competing());
        q.admit(shutdown_op().0);
        assert!(q.has_competing());
    }
}
