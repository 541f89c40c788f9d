mod common;

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use bootvisor::{
    BootResult, Container, ContainerConfig, ContainerError, Event, EventKind, LaunchContext,
    OperationGate, Phase, Service, ServiceError, ServiceId, Subscribe,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use common::{A, B, C, Journal, Probe, id_a, id_b};

fn container() -> Container {
    Container::builder(ContainerConfig::default()).build()
}

/// Resolves other services from inside its own boot call.
#[derive(Default)]
struct Inspector {
    container: OnceLock<Container>,
    seen: Mutex<Vec<Result<bool, ContainerError>>>,
}

#[async_trait]
impl Service for Inspector {
    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        let _ = self.container.set(container.clone());
        Vec::new()
    }

    async fn boot(&self, _ctx: &LaunchContext) -> Result<(), ServiceError> {
        let Some(container) = self.container.get() else {
            return Err(ServiceError::failed("no container"));
        };
        let mut seen = self.seen.lock().unwrap();
        seen.push(container.resolve::<dyn A>().map(|_| true));
        seen.push(container.resolve::<dyn B>().map(|_| true));
        seen.push(container.try_resolve::<dyn C>().map(|s| s.is_some()));
        Ok(())
    }
}

impl B for Inspector {}

#[tokio::test]
async fn resolve_guards_services_that_have_not_booted() {
    let journal = Journal::default();
    let container = container();
    let inspector = Arc::new(Inspector::default());

    // B (inspector) boots before A, which depends on it.
    container.register::<dyn B>(inspector.clone()).unwrap();
    container
        .register::<dyn A>(Probe::new("A", &journal).after(id_b()).arc())
        .unwrap();

    container.boot(LaunchContext::new()).await.unwrap();

    assert_eq!(
        *inspector.seen.lock().unwrap(),
        vec![
            Err(ContainerError::NotReadyYet { service: id_a() }),
            Err(ContainerError::NotReadyYet { service: id_b() }),
            Ok(false),
        ]
    );
    assert!(container.resolve::<dyn A>().is_ok());
}

#[test]
fn resolve_distinguishes_missing_from_registered() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();

    assert!(container.resolve::<dyn A>().is_ok());
    assert_eq!(
        container.resolve::<dyn B>().err(),
        Some(ContainerError::NotFound { service: id_b() })
    );
    assert!(matches!(container.try_resolve::<dyn B>(), Ok(None)));
    assert!(!container.is_empty());
}

#[tokio::test]
async fn waiters_wake_once_boot_completes() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Probe::new("A", &journal).slow(Duration::from_millis(5)).arc())
        .unwrap();

    let ready = tokio::spawn({
        let c = container.clone();
        async move { c.ready().await }
    });
    let service = tokio::spawn({
        let c = container.clone();
        async move { c.wait_for::<dyn A>().await.map(|_| ()) }
    });
    tokio::task::yield_now().await;

    container.boot(LaunchContext::new()).await.unwrap();

    ready.await.unwrap();
    assert_eq!(service.await.unwrap(), Ok(()));

    // Already booted: both return right away.
    container.ready().await;
    assert!(container.wait_for::<dyn A>().await.is_ok());
}

#[tokio::test]
async fn ready_wakes_when_shutdown_is_queued_behind_boot() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();

    let ready = tokio::spawn({
        let c = container.clone();
        async move { c.ready().await }
    });
    tokio::task::yield_now().await;

    // Both are queued before the driver runs, so the container is already
    // back in `Initial` when the waiter gets polled.
    let boot = container.boot(LaunchContext::new());
    let stop = container.shutdown();
    let (result, ()) = tokio::join!(boot, stop);
    assert!(matches!(result, Err(bootvisor::BootError::Canceled { .. })));
    assert_eq!(container.phase(), Phase::Initial);

    tokio::time::timeout(Duration::from_secs(1), ready)
        .await
        .expect("ready() missed the finished attempt")
        .unwrap();
}

#[tokio::test]
async fn wait_for_unregistered_contract_fails() {
    let container = container();
    assert_eq!(
        container.wait_for::<dyn C>().await.err(),
        Some(ContainerError::NotFound {
            service: ServiceId::of::<dyn C>()
        })
    );
}

/// Requests shutdown from its completion hook.
struct SelfStopping {
    container: OnceLock<Container>,
    journal: Journal,
}

#[async_trait]
impl Service for SelfStopping {
    fn dependencies(&self, container: &Container) -> Vec<ServiceId> {
        let _ = self.container.set(container.clone());
        Vec::new()
    }

    async fn shutdown(&self) {
        self.journal.push("stop:self".into());
    }

    fn on_boot_completed(&self, _result: &BootResult) {
        if let Some(container) = self.container.get() {
            drop(container.shutdown());
        }
    }
}

impl A for SelfStopping {}

#[tokio::test]
async fn hooks_can_call_back_into_the_container() {
    let journal = Journal::default();
    let container = container();
    let mut events = container.subscribe();
    container
        .register::<dyn A>(Arc::new(SelfStopping {
            container: OnceLock::new(),
            journal: journal.clone(),
        }))
        .unwrap();

    container.boot(LaunchContext::new()).await.unwrap();

    loop {
        let ev = events.recv().await.unwrap();
        if ev.kind == EventKind::ShutdownCompleted {
            break;
        }
    }
    assert_eq!(journal.stops(), vec!["self"]);
    assert_eq!(container.phase(), Phase::Initial);
}

#[tokio::test]
async fn wait_for_sees_a_boot_that_was_already_undone() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Arc::new(SelfStopping {
            container: OnceLock::new(),
            journal: journal.clone(),
        }))
        .unwrap();

    let waiter = tokio::spawn({
        let c = container.clone();
        async move { c.wait_for::<dyn A>().await.map(|_| ()) }
    });
    tokio::task::yield_now().await;

    container.boot(LaunchContext::new()).await.unwrap();

    let woke = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("wait_for() missed the completed boot")
        .unwrap();
    assert_eq!(woke, Ok(()));
}

/// Forwards every event kind to a channel.
struct Forward(mpsc::UnboundedSender<EventKind>);

#[async_trait]
impl Subscribe for Forward {
    async fn on_event(&self, event: &Event) {
        let _ = self.0.send(event.kind);
    }

    fn name(&self) -> &'static str {
        "forward"
    }
}

#[tokio::test]
async fn subscribers_see_the_full_lifecycle() {
    let journal = Journal::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Forward(tx))];
    let container = Container::builder(ContainerConfig::default())
        .with_subscribers(subs)
        .build();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();

    container.boot(LaunchContext::new()).await.unwrap();
    container.shutdown().await;

    let mut kinds = Vec::new();
    while let Some(kind) = rx.recv().await {
        kinds.push(kind);
        if kind == EventKind::ShutdownCompleted {
            break;
        }
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::BootRequested,
            EventKind::BootStarted,
            EventKind::ServiceBooting,
            EventKind::ServiceBooted,
            EventKind::BootCompleted,
            EventKind::ShutdownRequested,
            EventKind::ShutdownStarted,
            EventKind::ServiceStopping,
            EventKind::ServiceStopped,
            EventKind::ShutdownCompleted,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn slow_boot_reports_pending_services() {
    let journal = Journal::default();
    let container = Container::builder(ContainerConfig {
        stall_report: Duration::from_millis(100),
        ..ContainerConfig::default()
    })
    .build();
    let mut events = container.subscribe();
    container
        .register::<dyn A>(Probe::new("A", &journal).slow(Duration::from_millis(250)).arc())
        .unwrap();
    container
        .register::<dyn B>(Probe::new("B", &journal).after(id_a()).arc())
        .unwrap();

    container.boot(LaunchContext::new()).await.unwrap();

    let mut stalls = Vec::new();
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::BootStalled {
            stalls.push(ev);
        }
    }
    assert_eq!(stalls.len(), 2);
    let pending: Vec<&str> = stalls[0]
        .pending
        .as_deref()
        .unwrap()
        .iter()
        .map(|s| &**s)
        .collect();
    assert_eq!(pending, ["A", "B"]);
    assert_eq!(stalls[0].service.as_deref(), Some("A"));
}

#[tokio::test]
async fn serve_delivers_every_event_before_returning() {
    let journal = Journal::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Forward(tx))];
    let container = Container::builder(ContainerConfig::default())
        .with_subscribers(subs)
        .build();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    assert_eq!(container.serve(LaunchContext::new(), token).await, Ok(()));

    let mut kinds = Vec::new();
    while let Ok(kind) = rx.try_recv() {
        kinds.push(kind);
    }
    assert_eq!(kinds.first(), Some(&EventKind::BootRequested));
    assert_eq!(kinds.last(), Some(&EventKind::ShutdownCompleted));

    // The lanes are gone; a second close is a no-op.
    container.close_subscribers().await;
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn serve_runs_until_the_token_is_cancelled() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();

    let mut events = container.subscribe();
    let token = CancellationToken::new();
    let serving = tokio::spawn({
        let c = container.clone();
        let token = token.clone();
        async move { c.serve(LaunchContext::new(), token).await }
    });

    container.ready().await;
    assert!(container.is_booted::<dyn A>());
    token.cancel();

    assert_eq!(serving.await.unwrap(), Ok(()));
    assert_eq!(journal.stops(), vec!["A"]);
    assert_eq!(container.phase(), Phase::Initial);

    let mut requested = None;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ShutdownRequested {
            requested = ev.reason;
        }
    }
    assert_eq!(requested.as_deref(), Some("token canceled"));
}

#[tokio::test]
async fn serve_returns_boot_failure_after_stopping_booted_services() {
    let journal = Journal::default();
    let container = container();
    container
        .register::<dyn A>(Probe::new("A", &journal).arc())
        .unwrap();
    container
        .register::<dyn B>(Probe::new("B", &journal).after(id_a()).failing().arc())
        .unwrap();

    let err = container
        .serve(LaunchContext::new(), CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.service(), Some(&id_b()));
    assert_eq!(journal.stops(), vec!["A"]);
    assert_eq!(container.phase(), Phase::Initial);
}

/// Worker whose shutdown waits for in-flight jobs.
struct Worker {
    gate: OperationGate,
    journal: Journal,
}

impl Worker {
    async fn job(&self, label: &str) -> Result<(), ServiceError> {
        let _guard = self.gate.enter()?;
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.journal.push(format!("job:{label}"));
        Ok(())
    }
}

#[async_trait]
impl Service for Worker {
    async fn shutdown(&self) {
        self.gate.close_and_drain().await;
        self.journal.push("stop:worker".into());
    }
}

impl C for Worker {}

#[tokio::test(start_paused = true)]
async fn shutdown_drains_in_flight_operations() {
    let journal = Journal::default();
    let container = container();
    let worker = Arc::new(Worker {
        gate: OperationGate::new(),
        journal: journal.clone(),
    });
    container.register::<dyn C>(worker.clone()).unwrap();
    container.boot(LaunchContext::new()).await.unwrap();

    let job = tokio::spawn({
        let worker = Arc::clone(&worker);
        async move { worker.job("late").await }
    });
    tokio::task::yield_now().await;

    container.shutdown().await;
    assert_eq!(job.await.unwrap(), Ok(()));
    assert_eq!(journal.entries(), vec!["job:late", "stop:worker"]);
    assert_eq!(worker.job("rejected").await, Err(ServiceError::NotActive));
}
