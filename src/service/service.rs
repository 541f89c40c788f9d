//! # Service contract.
//!
//! Every component managed by the [`Container`] implements [`Service`].
//! Callers usually define a *contract* trait on top of it and register the
//! implementation as the trait object:
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bootvisor::{Container, ContainerConfig, LaunchContext, Service, ServiceError};
//!
//! trait Clock: Service {
//!     fn now(&self) -> u64;
//! }
//!
//! struct SystemClock;
//!
//! #[async_trait]
//! impl Service for SystemClock {
//!     async fn boot(&self, _ctx: &LaunchContext) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//! }
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 { 42 }
//! }
//!
//! let container = Container::builder(ContainerConfig::default()).build();
//! container.register::<dyn Clock>(Arc::new(SystemClock)).unwrap();
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Container;
use crate::error::{BootResult, ServiceError};
use crate::service::{LaunchContext, ServiceId};

/// # Asynchronously booted, asynchronously shut down component.
///
/// All methods have no-op defaults, so a service only overrides what it needs.
///
/// ### Call order within one boot attempt
/// 1. [`on_boot_began`](Service::on_boot_began) on every registered service
/// 2. [`dependencies`](Service::dependencies) on every registered service
/// 3. [`boot`](Service::boot), one service at a time, in dependency order
/// 4. [`on_boot_completed`](Service::on_boot_completed) on every registered service
///
/// [`shutdown`](Service::shutdown) is called later, only for services whose
/// boot succeeded, in reverse boot-completion order.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Human-readable name used in events. Defaults to the concrete type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Contracts this service needs booted before itself.
    ///
    /// Called once per boot attempt, before any service boots. The container
    /// may be kept (it is a cheap handle) for later resolution.
    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        let _ = container;
        Vec::new()
    }

    /// Boots the service. Every dependency has finished booting when this runs.
    async fn boot(&self, ctx: &LaunchContext) -> Result<(), ServiceError> {
        let _ = ctx;
        Ok(())
    }

    /// Stops the service. There is no failure channel.
    async fn shutdown(&self) {}

    /// The container began a boot attempt.
    fn on_boot_began(&self) {}

    /// The container finished a boot attempt (successfully or not).
    fn on_boot_completed(&self, result: &BootResult) {
        let _ = result;
    }
}

/// Shared handle to a type-erased service.
pub(crate) type ServiceRef = Arc<dyn Service>;

/// Adapter exposing an `Arc<C>` registered under contract `C` as `dyn Service`.
///
/// `C` is typically itself a trait object, which cannot be unsized into
/// `dyn Service` directly.
pub(crate) struct Erased<C: ?Sized>(pub(crate) Arc<C>);

#[async_trait]
impl<C: ?Sized + Service> Service for Erased<C> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        self.0.dependencies(container)
    }

    async fn boot(&self, ctx: &LaunchContext) -> Result<(), ServiceError> {
        self.0.boot(ctx).await
    }

    async fn shutdown(&self) {
        self.0.shutdown().await
    }

    fn on_boot_began(&self) {
        self.0.on_boot_began()
    }

    fn on_boot_completed(&self, result: &BootResult) {
        self.0.on_boot_completed(result)
    }
}
