#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bootvisor::{Container, LaunchContext, Service, ServiceError, ServiceId};

pub trait A: Service {}
pub trait B: Service {}
pub trait C: Service {}
pub trait D: Service {}

/// Shared log of `boot:<name>` / `stop:<name>` entries.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn boots(&self) -> Vec<String> {
        self.with_prefix("boot:")
    }

    pub fn stops(&self) -> Vec<String> {
        self.with_prefix("stop:")
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_owned))
            .collect()
    }
}

/// Configurable test service.
pub struct Probe {
    pub name: &'static str,
    pub deps: Vec<ServiceId>,
    pub fail: bool,
    pub delay: Duration,
    pub journal: Journal,
}

impl Probe {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            deps: Vec::new(),
            fail: false,
            delay: Duration::ZERO,
            journal: journal.clone(),
        }
    }

    pub fn after(mut self, dep: ServiceId) -> Self {
        self.deps.push(dep);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Service for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self, _container: &Container) -> Vec<ServiceId> {
        self.deps.clone()
    }

    async fn boot(&self, _ctx: &LaunchContext) -> Result<(), ServiceError> {
        self.journal.push(format!("boot:{}", self.name));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ServiceError::failed("boom"));
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.journal.push(format!("stop:{}", self.name));
    }
}

impl A for Probe {}
impl B for Probe {}
impl C for Probe {}
impl D for Probe {}

pub fn id_a() -> ServiceId {
    ServiceId::of::<dyn A>()
}

pub fn id_b() -> ServiceId {
    ServiceId::of::<dyn B>()
}

pub fn id_c() -> ServiceId {
    ServiceId::of::<dyn C>()
}

pub fn id_d() -> ServiceId {
    ServiceId::of::<dyn D>()
}
