//! Health check lifecycle: startup, serving, and graceful shutdown
//!
//! `Created -> Initialized -> Running -> ShuttingDown -> Stopped`
//!
//! [`HealthCheck::run`] launches three activities and returns immediately:
//! - the readiness evaluation loop
//! - the serve activity, which binds the listener and serves the router
//! - the shutdown watcher, which waits for the [`ShutdownSignal`]
//!
//! On shutdown the watcher tells the server to stop accepting, waits up to
//! the grace period for in-flight requests to drain, then hands the outcome
//! to the serve activity over a single-use channel. The serve activity runs
//! on the caller's [`TaskTracker`], so waiting on the tracker waits for the
//! whole serve operation including that handoff.

use crate::server::config::HealthCheckConfig;
use crate::server::error::HealthCheckError;
use crate::server::health::build_router;
use crate::server::probe::ReadinessProbe;
use crate::server::readiness::{ReadinessEvaluator, ReadinessState};
use crate::server::shutdown::ShutdownSignal;
use axum::Router;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Initialized,
    Running,
    ShuttingDown,
    Stopped,
}

/// How the bounded shutdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished within the grace period
    Drained,
    /// The grace period elapsed with requests still in flight
    GraceExceeded,
}

/// Receives failures that leave the process without a health surface
pub type FatalHandler = Arc<dyn Fn(HealthCheckError) + Send + Sync>;

/// Log the failure and exit the process
fn exit_on_fatal(err: HealthCheckError) {
    error!(error = %err, "Health check server terminated unexpectedly, exiting");
    std::process::exit(1);
}

/// Set up by [`HealthCheck::init`], consumed by [`HealthCheck::run`]
struct ServerSetup {
    listen_addr: SocketAddr,
    router: Router,
    tracker: TaskTracker,
}

/// Liveness and readiness endpoint embedded in a long-running service
pub struct HealthCheck {
    config: HealthCheckConfig,
    readiness: ReadinessState,
    evaluator: Option<ReadinessEvaluator>,
    server: Option<ServerSetup>,
    lifecycle: Arc<watch::Sender<LifecycleState>>,
    local_addr: watch::Receiver<Option<SocketAddr>>,
    local_addr_tx: Option<watch::Sender<Option<SocketAddr>>>,
    on_fatal: FatalHandler,
}

impl HealthCheck {
    pub fn new() -> Self {
        Self::with_config(HealthCheckConfig::default())
    }

    pub fn with_config(config: HealthCheckConfig) -> Self {
        let readiness = ReadinessState::new();
        let evaluator = ReadinessEvaluator::new(readiness.clone(), config.evaluation_interval);
        let (lifecycle, _) = watch::channel(LifecycleState::Created);
        let (local_addr_tx, local_addr) = watch::channel(None);

        Self {
            config,
            readiness,
            evaluator: Some(evaluator),
            server: None,
            lifecycle: Arc::new(lifecycle),
            local_addr,
            local_addr_tx: Some(local_addr_tx),
            on_fatal: Arc::new(exit_on_fatal),
        }
    }

    /// Replace the default fatal handler (log and exit the process)
    ///
    /// Use this to escalate to a supervisor instead. The lifecycle moves to
    /// `Stopped` once the handler returns.
    pub fn with_fatal_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(HealthCheckError) + Send + Sync + 'static,
    {
        self.on_fatal = Arc::new(handler);
        self
    }

    /// Prepare the listener address and routes
    ///
    /// `tracker` is the completion barrier: the serve activity is spawned on
    /// it, so `tracker.close(); tracker.wait().await` returns once the
    /// listener has shut down.
    pub fn init(
        &mut self,
        listen_addr: SocketAddr,
        tracker: TaskTracker,
    ) -> Result<(), HealthCheckError> {
        if self.state() != LifecycleState::Created {
            return Err(HealthCheckError::AlreadyInitialized);
        }

        info!(addr = %listen_addr, "Initializing health check");

        self.server = Some(ServerSetup {
            listen_addr,
            router: build_router(self.readiness.clone()),
            tracker,
        });
        self.lifecycle.send_replace(LifecycleState::Initialized);

        info!("Health check initialized");
        Ok(())
    }

    /// Register a readiness probe
    ///
    /// Probes must be registered before [`run`](Self::run).
    pub fn add_readiness_probe<P>(&mut self, probe: P) -> Result<(), HealthCheckError>
    where
        P: ReadinessProbe + 'static,
    {
        self.add_shared_readiness_probe(Arc::new(probe))
    }

    /// Register a probe the application also keeps a handle to
    pub fn add_shared_readiness_probe(
        &mut self,
        probe: Arc<dyn ReadinessProbe>,
    ) -> Result<(), HealthCheckError> {
        let evaluator = self
            .evaluator
            .as_mut()
            .ok_or(HealthCheckError::ProbeAfterRun)?;
        info!(probe = probe.name(), "Registering readiness probe");
        evaluator.add_probe(probe);
        Ok(())
    }

    /// Launch the evaluation loop, the listener, and the shutdown watcher
    ///
    /// Returns as soon as they are spawned; bind failures surface later
    /// through the fatal handler. Must be called inside a tokio runtime.
    pub fn run(&mut self, shutdown: ShutdownSignal) -> Result<(), HealthCheckError> {
        match self.state() {
            LifecycleState::Created => return Err(HealthCheckError::NotInitialized),
            LifecycleState::Initialized => {}
            _ => return Err(HealthCheckError::AlreadyRunning),
        }

        let (Some(server), Some(evaluator), Some(local_addr_tx)) = (
            self.server.take(),
            self.evaluator.take(),
            self.local_addr_tx.take(),
        ) else {
            return Err(HealthCheckError::AlreadyRunning);
        };

        info!(
            addr = %server.listen_addr,
            probes = evaluator.probe_count(),
            interval_ms = evaluator.interval().as_millis() as u64,
            "Running health check"
        );
        self.lifecycle.send_replace(LifecycleState::Running);

        let (stop_tx, stop_rx) = oneshot::channel();
        let (drained_tx, drained_rx) = oneshot::channel();
        let (handoff_tx, handoff_rx) = oneshot::channel();

        tokio::spawn(evaluator.run(shutdown.clone()));

        tokio::spawn(watch_for_shutdown(
            shutdown.clone(),
            self.config.grace_period,
            self.lifecycle.clone(),
            stop_tx,
            drained_rx,
            handoff_tx,
        ));

        let serve_activity = ServeActivity {
            listen_addr: server.listen_addr,
            router: server.router,
            shutdown,
            local_addr: local_addr_tx,
            stop: stop_rx,
            drained: drained_tx,
            handoff: handoff_rx,
        };
        let lifecycle = self.lifecycle.clone();
        let on_fatal = self.on_fatal.clone();
        server.tracker.spawn(async move {
            if let Err(e) = serve_activity.serve().await {
                on_fatal(e);
            }
            lifecycle.send_replace(LifecycleState::Stopped);
        });

        Ok(())
    }

    /// Point-in-time readiness, read the same way the `/ready-check` handler reads it
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Shared handle to the readiness state
    pub fn readiness(&self) -> ReadinessState {
        self.readiness.clone()
    }

    pub fn state(&self) -> LifecycleState {
        *self.lifecycle.borrow()
    }

    /// Subscribe to lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Address the listener is bound to, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.borrow()
    }

    /// Wait until the listener is bound
    ///
    /// Returns `None` if the serve activity ends without binding.
    pub async fn wait_until_listening(&self) -> Option<SocketAddr> {
        let mut rx = self.local_addr.clone();
        let bound = rx.wait_for(Option::is_some).await.ok()?;
        *bound
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown, then stop the listener within the grace period
async fn watch_for_shutdown(
    mut shutdown: ShutdownSignal,
    grace_period: Duration,
    lifecycle: Arc<watch::Sender<LifecycleState>>,
    stop: oneshot::Sender<()>,
    drained: oneshot::Receiver<()>,
    handoff: oneshot::Sender<ShutdownOutcome>,
) {
    shutdown.wait().await;

    info!(
        grace_period_ms = grace_period.as_millis() as u64,
        "Health check shutdown initiated"
    );
    lifecycle.send_if_modified(|state| {
        if *state == LifecycleState::Running {
            *state = LifecycleState::ShuttingDown;
            true
        } else {
            false
        }
    });

    let _ = stop.send(());

    let outcome = match tokio::time::timeout(grace_period, drained).await {
        Ok(_) => ShutdownOutcome::Drained,
        Err(_) => {
            warn!(
                grace_period_ms = grace_period.as_millis() as u64,
                "Grace period elapsed before in-flight requests finished"
            );
            ShutdownOutcome::GraceExceeded
        }
    };

    let _ = handoff.send(outcome);
}

/// Everything the serve activity owns for its lifetime
struct ServeActivity {
    listen_addr: SocketAddr,
    router: Router,
    shutdown: ShutdownSignal,
    local_addr: watch::Sender<Option<SocketAddr>>,
    stop: oneshot::Receiver<()>,
    drained: oneshot::Sender<()>,
    handoff: oneshot::Receiver<ShutdownOutcome>,
}

impl ServeActivity {
    async fn serve(self) -> Result<(), HealthCheckError> {
        let Self {
            listen_addr,
            router,
            shutdown,
            local_addr,
            stop,
            drained,
            mut handoff,
        } = self;

        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|source| HealthCheckError::Bind {
                addr: listen_addr,
                source,
            })?;
        let bound = listener.local_addr().unwrap_or(listen_addr);
        local_addr.send_replace(Some(bound));
        // Log after successful bind - server is actually listening
        info!(addr = %bound, "Health check server listening");

        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop.await;
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                result.map_err(HealthCheckError::Serve)?;
                if !shutdown.is_shutdown() {
                    return Err(HealthCheckError::ListenerClosed);
                }
                let _ = drained.send(());
                // Wait for the watcher's handoff before reporting completion
                let _ = handoff.await;
            }
            outcome = &mut handoff => {
                if let Ok(outcome) = outcome {
                    warn!(outcome = ?outcome, "Health check server stopped with requests in flight");
                }
            }
        }

        info!("Health check shutdown complete");
        Ok(())
    }
}
