//! Error types used by the bootvisor container and services.
//!
//! This module defines three error enums:
//!
//! - [`ContainerError`] : misuse of the registration/resolution API.
//! - [`BootError`] : the aggregate failure of one boot attempt.
//! - [`ServiceError`] : errors reported by an individual service.
//!
//! All of them provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::service::ServiceId;

/// Result of one boot attempt, as delivered to the caller of
/// [`Container::boot`](crate::Container::boot) and to every service's
/// [`on_boot_completed`](crate::Service::on_boot_completed) hook.
pub type BootResult = Result<(), BootError>;

/// # Errors produced by the container API.
///
/// Configuration errors are returned synchronously from `register`;
/// `NotFound` / `NotReadyYet` come from `resolve`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// A service is already registered under this contract.
    #[error("service {service} is already registered")]
    DuplicateService {
        /// Contract that was registered twice.
        service: ServiceId,
    },

    /// The same instance is already registered under another contract.
    #[error("instance registered as {service} is already registered as {existing}")]
    DuplicateInstance {
        /// Contract of the rejected registration.
        service: ServiceId,
        /// Contract the instance is already registered under.
        existing: ServiceId,
    },

    /// Registration attempted after boot began.
    #[error("container already booted")]
    AlreadyBooted,

    /// Nothing is registered under this contract.
    #[error("service {service} is not registered")]
    NotFound {
        /// Requested contract.
        service: ServiceId,
    },

    /// The service is registered but has not finished booting yet.
    ///
    /// This is a programming error: the caller looked the service up before
    /// its dependency ordering guarantees it exists.
    #[error("service {service} is not ready yet")]
    NotReadyYet {
        /// Requested contract.
        service: ServiceId,
    },
}

impl ContainerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use bootvisor::ContainerError;
    ///
    /// assert_eq!(ContainerError::AlreadyBooted.as_label(), "container_already_booted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ContainerError::DuplicateService { .. } => "container_duplicate_service",
            ContainerError::DuplicateInstance { .. } => "container_duplicate_instance",
            ContainerError::AlreadyBooted => "container_already_booted",
            ContainerError::NotFound { .. } => "container_not_found",
            ContainerError::NotReadyYet { .. } => "container_not_ready_yet",
        }
    }
}

/// # Aggregate failure of a boot attempt.
///
/// Boot is fast-abort: at most one service failure is ever reported.
/// Dependency errors abort the attempt before any service boots.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    /// A service reported a failure; services after it were never invoked.
    #[error("'{service}' failed with: {error}")]
    ServiceFailed {
        /// The failing service.
        service: ServiceId,
        /// Error it reported.
        error: ServiceError,
    },

    /// A competing operation was queued before `service` was invoked.
    ///
    /// Synthetic: `service` never ran. `skipped` lists the services ordered
    /// after it that were not invoked either.
    #[error("'{service}' failed with: boot canceled")]
    Canceled {
        /// Next-in-line service that was not invoked.
        service: ServiceId,
        /// Remaining services after `service`, in boot order.
        skipped: Vec<ServiceId>,
    },

    /// A service declared a dependency that was never registered.
    #[error("'{service}' depends on unregistered '{dependency}'")]
    UnknownDependency {
        /// Declaring service.
        service: ServiceId,
        /// Unregistered dependency.
        dependency: ServiceId,
    },

    /// The dependency graph has a cycle; `cycle` starts and ends at the same id.
    #[error("cyclic dependency: {}", render_path(.cycle))]
    CyclicDependency {
        /// One concrete cycle path.
        cycle: Vec<ServiceId>,
    },

    /// Boot was requested while the container was not in the initial phase.
    #[error("container already booted")]
    AlreadyBooted,

    /// The task driving the operation queue stopped before reporting a result
    /// (the runtime shut down mid-boot).
    #[error("boot interrupted before completion")]
    Interrupted,
}

impl BootError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootError::ServiceFailed { .. } => "boot_service_failed",
            BootError::Canceled { .. } => "boot_canceled",
            BootError::UnknownDependency { .. } => "boot_unknown_dependency",
            BootError::CyclicDependency { .. } => "boot_cyclic_dependency",
            BootError::AlreadyBooted => "boot_already_booted",
            BootError::Interrupted => "boot_interrupted",
        }
    }

    /// Returns the service this failure is attributed to, if any.
    pub fn service(&self) -> Option<&ServiceId> {
        match self {
            BootError::ServiceFailed { service, .. }
            | BootError::Canceled { service, .. }
            | BootError::UnknownDependency { service, .. } => Some(service),
            BootError::CyclicDependency { .. }
            | BootError::AlreadyBooted
            | BootError::Interrupted => None,
        }
    }

    /// `true` for the synthetic failure caused by a competing operation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, BootError::Canceled { .. })
    }
}

fn render_path(path: &[ServiceId]) -> String {
    path.iter()
        .map(ServiceId::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// # Errors reported by a single service.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Boot failed.
    #[error("boot failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Boot did not complete within the configured timeout.
    #[error("boot timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Boot panicked.
    #[error("boot panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The service no longer accepts operations (see [`OperationGate`](crate::OperationGate)).
    #[error("service is not active")]
    NotActive,
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Failed`].
    ///
    /// # Example
    /// ```
    /// use bootvisor::ServiceError;
    ///
    /// let err = ServiceError::failed("connection refused");
    /// assert_eq!(err.to_string(), "boot failed: connection refused");
    /// ```
    pub fn failed(error: impl std::fmt::Display) -> Self {
        ServiceError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Failed { .. } => "service_failed",
            ServiceError::Timeout { .. } => "service_timeout",
            ServiceError::Panicked { .. } => "service_panicked",
            ServiceError::NotActive => "service_not_active",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Alpha {}
    trait Beta {}

    #[test]
    fn cycle_renders_as_path() {
        let a = ServiceId::of::<dyn Alpha>();
        let b = ServiceId::of::<dyn Beta>();
        let err = BootError::CyclicDependency {
            cycle: vec![a, b, a],
        };
        let text = err.to_string();
        assert!(text.starts_with("cyclic dependency: "));
        assert_eq!(text.matches(" -> ").count(), 2);
        assert!(text.contains("Alpha"));
    }

    #[test]
    fn canceled_is_distinguishable_from_service_failure() {
        let a = ServiceId::of::<dyn Alpha>();
        let canceled = BootError::Canceled {
            service: a,
            skipped: vec![],
        };
        let failed = BootError::ServiceFailed {
            service: a,
            error: ServiceError::failed("boom"),
        };
        assert!(canceled.is_canceled());
        assert!(!failed.is_canceled());
        assert_eq!(canceled.service(), Some(&a));
        assert_eq!(failed.service(), Some(&a));
        assert_eq!(canceled.as_label(), "boot_canceled");
    }
}
