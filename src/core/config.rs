//! # Container configuration.
//!
//! Provides [`ContainerConfig`], centralized settings for a [`Container`](crate::Container),
//! passed once to [`Container::builder`](crate::Container::builder).
//!
//! ## Sentinel values
//! - `boot_timeout = 0s` → no per-service boot timeout
//! - `stall_report = 0s` → no "still booting" reports

use std::time::Duration;

/// How the boot pipeline invokes each service's boot call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvocationPolicy {
    /// Invoke the next service right away on the orchestrator task.
    #[default]
    Immediate,
    /// Yield to the scheduler before invoking each service.
    Deferred,
}

/// Configuration for a container.
///
/// ## Field semantics
/// - `invocation`: Whether to yield to the scheduler before each boot call
/// - `boot_timeout`: Maximum duration of one service boot call (`0s` = unlimited)
/// - `stall_report`: Interval of `BootStalled` events while a boot call is in flight (`0s` = off)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Invocation policy, fixed for the container's lifetime.
    pub invocation: InvocationPolicy,

    /// Per-service boot timeout.
    ///
    /// An expired boot is reported as [`ServiceError::Timeout`](crate::ServiceError::Timeout)
    /// and aborts the attempt like any other failure.
    pub boot_timeout: Duration,

    /// Interval between "still booting" diagnostics.
    pub stall_report: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl ContainerConfig {
    /// Returns the per-service boot timeout as an `Option`.
    #[inline]
    pub fn boot_timeout(&self) -> Option<Duration> {
        if self.boot_timeout == Duration::ZERO {
            None
        } else {
            Some(self.boot_timeout)
        }
    }

    /// Returns the stall report interval as an `Option`.
    #[inline]
    pub fn stall_report(&self) -> Option<Duration> {
        if self.stall_report == Duration::ZERO {
            None
        } else {
            Some(self.stall_report)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ContainerConfig {
    /// Default configuration:
    ///
    /// - `invocation = Immediate`
    /// - `boot_timeout = 0s` (no timeout)
    /// - `stall_report = 1s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            invocation: InvocationPolicy::Immediate,
            boot_timeout: Duration::ZERO,
            stall_report: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}
