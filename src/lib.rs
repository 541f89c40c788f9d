//! # bootvisor
//!
//! **Bootvisor** is a service lifecycle orchestrator for async Rust.
//!
//! Components ("services") are registered under a contract type, declare
//! which contracts they depend on, and are then booted one at a time in
//! dependency order and shut down in exactly the reverse order in which
//! they finished booting. No caller can resolve a service before it has
//! finished booting.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  dyn Db      │   │  dyn Cache   │   │  dyn Api     │
//!     │ (Service #1) │   │ (Service #2) │   │ (Service #3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ register         ▼ register         ▼ register
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Container (orchestrator handle)                                  │
//! │  - Registry (contracts, registration order, instance identity)    │
//! │  - Phase (Initial / Booting / BootCompleted / ShuttingDown)       │
//! │  - Operation queue (boot / shutdown, FIFO, one at a time)         │
//! │  - Bus (broadcast events)                                         │
//! └──────┬────────────────────────────────────────────────────┬───────┘
//!        ▼ boot(ctx)                                          ▼ shutdown()
//!   graph::build ─► topo::sort ─► boot each in order     stop each booted,
//!   (fast-abort, preemptible)                            last-booted first
//!        │                                                    │
//!        └───────────── publish(Event) ──► Bus ◄──────────────┘
//!                                           │
//!                               ┌───────────┴───────────┐
//!                               ▼                       ▼
//!                      subscriber_listener      ready() / wait_for()
//!                               │
//!                         SubscriberSet
//!                      ┌────────┼─────────┐
//!                      ▼        ▼         ▼
//!                   worker1  worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! register* ──► boot ──► [ shutdown ──► register* ──► boot ]*
//!
//! boot:
//!   ├─► on_boot_began() on every service
//!   ├─► dependencies() on every service ─► graph ─► order (or cycle / unknown dep)
//!   ├─► for each service in order:
//!   │       ├─ competing operation queued ─► Canceled(next), stop
//!   │       ├─ boot() Err / panic / timeout ─► ServiceFailed(service), stop
//!   │       └─ boot() Ok ─► booted list += service
//!   └─► on_boot_completed(&result) on every service
//!
//! shutdown:
//!   └─► shutdown() on every booted service, reverse completion order
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                              |
//! |-------------------|-----------------------------------------------------------------|-------------------------------------------------|
//! | **Services**      | Implement the lifecycle contract; register as a contract trait. | [`Service`], [`ServiceId`], [`LaunchContext`]   |
//! | **Orchestration** | Register, resolve, boot, shut down, wait for readiness.         | [`Container`], [`Phase`]                        |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).          | [`Subscribe`], [`Event`], [`EventKind`]         |
//! | **Errors**        | Typed errors for the API, boot attempts and services.           | [`ContainerError`], [`BootError`], [`ServiceError`] |
//! | **Configuration** | Invocation policy, boot timeout, stall reports, bus capacity.   | [`ContainerConfig`], [`InvocationPolicy`]       |
//! | **Drain helper**  | Count in-flight operations so shutdown can wait for them.       | [`OperationGate`]                               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bootvisor::{Container, ContainerConfig, LaunchContext, Service, ServiceError};
//!
//! trait Store: Service {
//!     fn get(&self, key: &str) -> Option<String>;
//! }
//!
//! struct MemoryStore;
//!
//! #[async_trait]
//! impl Service for MemoryStore {
//!     async fn boot(&self, ctx: &LaunchContext) -> Result<(), ServiceError> {
//!         if ctx.contains("read_only") {
//!             return Err(ServiceError::failed("read-only media"));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Store for MemoryStore {
//!     fn get(&self, _key: &str) -> Option<String> { None }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn bootvisor::Subscribe>> = vec![Arc::new(bootvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn bootvisor::Subscribe>> = Vec::new();
//!
//!     let container = Container::builder(ContainerConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     container.register::<dyn Store>(Arc::new(MemoryStore))?;
//!     container.boot(LaunchContext::new()).await?;
//!
//!     let store = container.resolve::<dyn Store>()?;
//!     assert_eq!(store.get("missing"), None);
//!
//!     container.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod service;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Container, ContainerBuilder, ContainerConfig, InvocationPolicy, Phase};
pub use error::{BootError, BootResult, ContainerError, ServiceError};
pub use events::{Event, EventKind};
pub use service::{LaunchContext, OperationGate, OperationGuard, Service, ServiceId};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
