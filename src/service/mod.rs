//! # Service abstractions.
//!
//! This module provides the service-side types:
//! - [`Service`] - trait every managed component implements
//! - [`ServiceId`] - identifier derived from a service contract type
//! - [`LaunchContext`] - opaque payload handed to every boot call
//! - [`OperationGate`] - in-flight operation accounting for graceful shutdown

mod context;
mod gate;
mod id;
mod service;

pub use context::LaunchContext;
pub use gate::{OperationGate, OperationGuard};
pub use id::ServiceId;
pub use service::Service;

pub(crate) use service::{Erased, ServiceRef};
