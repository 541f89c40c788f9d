//! # Example: app_lifecycle
//!
//! A small application wired from three services with dependencies between them.
//!
//! Demonstrates how to:
//! - Define contract traits on top of [`Service`] and register implementations under them.
//! - Declare dependencies with [`ServiceId::of`].
//! - Observe the lifecycle through the built-in [`LogWriter`].
//! - Drain in-flight work on shutdown with an [`OperationGate`].
//! - Run until Ctrl-C (or a 3s timer) with [`Container::serve`].
//!
//! ## Flow
//! ```text
//! register Config, Database(→ Config), Http(→ Database)
//! serve()
//!   ├─► boot: Config ─► Database ─► Http
//!   ├─► wait for Ctrl-C / timer
//!   └─► shutdown: Http ─► Database ─► Config
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example app_lifecycle --features logging
//! ```

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use bootvisor::{
    Container, ContainerConfig, LaunchContext, LogWriter, OperationGate, Service, ServiceError,
    ServiceId, Subscribe,
};
use tokio_util::sync::CancellationToken;

trait Settings: Service {
    fn database_url(&self) -> String;
}

trait Database: Service {
    fn query(&self, sql: &str) -> Result<usize, ServiceError>;
}

trait Http: Service {}

struct EnvSettings {
    url: OnceLock<String>,
}

#[async_trait]
impl Service for EnvSettings {
    fn name(&self) -> &str {
        "settings"
    }

    async fn boot(&self, ctx: &LaunchContext) -> Result<(), ServiceError> {
        let url = ctx
            .get::<String>("database_url")
            .cloned()
            .unwrap_or_else(|| "postgres://localhost/app".into());
        let _ = self.url.set(url);
        Ok(())
    }
}

impl Settings for EnvSettings {
    fn database_url(&self) -> String {
        self.url.get().cloned().unwrap_or_default()
    }
}

struct Postgres {
    container: OnceLock<Container>,
    gate: OperationGate,
}

#[async_trait]
impl Service for Postgres {
    fn name(&self) -> &str {
        "database"
    }

    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        let _ = self.container.set(container.clone());
        vec![ServiceId::of::<dyn Settings>()]
    }

    async fn boot(&self, _ctx: &LaunchContext) -> Result<(), ServiceError> {
        let container = self
            .container
            .get()
            .ok_or_else(|| ServiceError::failed("container handle missing"))?;
        let settings = container
            .resolve::<dyn Settings>()
            .map_err(ServiceError::failed)?;

        println!("[database] connecting to {}", settings.database_url());
        tokio::time::sleep(Duration::from_millis(300)).await;
        self.gate.reopen();
        Ok(())
    }

    async fn shutdown(&self) {
        self.gate.close_and_drain().await;
        println!("[database] pool closed");
    }
}

impl Database for Postgres {
    fn query(&self, sql: &str) -> Result<usize, ServiceError> {
        let _op = self.gate.enter()?;
        Ok(sql.len())
    }
}

struct Server {
    container: OnceLock<Container>,
}

#[async_trait]
impl Service for Server {
    fn name(&self) -> &str {
        "http"
    }

    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        let _ = self.container.set(container.clone());
        vec![ServiceId::of::<dyn Database>()]
    }

    async fn boot(&self, _ctx: &LaunchContext) -> Result<(), ServiceError> {
        let db = self
            .container
            .get()
            .ok_or_else(|| ServiceError::failed("container handle missing"))?
            .resolve::<dyn Database>()
            .map_err(ServiceError::failed)?;
        let rows = db.query("select 1")?;
        println!("[http] warm-up query returned {rows}");
        Ok(())
    }

    async fn shutdown(&self) {
        println!("[http] listener closed");
    }
}

impl Http for Server {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the container with a stdout subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let container = Container::builder(ContainerConfig {
        boot_timeout: Duration::from_secs(5),
        ..ContainerConfig::default()
    })
    .with_subscribers(subs)
    .build();

    // 2. Register services (in any order; dependencies decide boot order)
    container.register::<dyn Http>(Arc::new(Server {
        container: OnceLock::new(),
    }))?;
    container.register::<dyn Database>(Arc::new(Postgres {
        container: OnceLock::new(),
        gate: OperationGate::new(),
    }))?;
    container.register::<dyn Settings>(Arc::new(EnvSettings {
        url: OnceLock::new(),
    }))?;

    // 3. Stop after 3s unless Ctrl-C comes first
    let token = CancellationToken::new();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        timer.cancel();
    });

    let ctx = LaunchContext::new().with("database_url", String::from("postgres://db/demo"));
    container.serve(ctx, token).await?;
    Ok(())
}
