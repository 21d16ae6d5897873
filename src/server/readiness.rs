//! Readiness state and the periodic evaluation loop
//!
//! The evaluator is the only writer of [`ReadinessState`]. Every pass ANDs the
//! registered probes (stopping at the first `false`) and overwrites the state.
//! The `/ready-check` handler only reads the stored value, so a request never
//! waits on a probe and may see a result up to one interval old.

use crate::server::probe::ReadinessProbe;
use crate::server::shutdown::ShutdownSignal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Default time between evaluation passes
pub const DEFAULT_EVALUATION_INTERVAL: Duration = Duration::from_secs(1);

/// Shared state for readiness tracking
///
/// Written by the evaluation loop, read by any number of request handlers.
#[derive(Debug, Clone)]
pub struct ReadinessState {
    ready: Arc<AtomicBool>,
}

impl ReadinessState {
    /// Create a new readiness state (initially not ready)
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overwrite the stored readiness
    pub fn set(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if the process is ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::new()
    }
}

/// AND over all probes, stopping at the first probe that is not ready
///
/// An empty set is ready.
pub fn evaluate_probes(probes: &[Arc<dyn ReadinessProbe>]) -> bool {
    for probe in probes {
        if !probe.is_ready() {
            debug!(probe = probe.name(), "Readiness probe not ready");
            return false;
        }
    }
    true
}

/// Owns the probe set and refreshes [`ReadinessState`] on a fixed cadence
pub struct ReadinessEvaluator {
    probes: Vec<Arc<dyn ReadinessProbe>>,
    state: ReadinessState,
    interval: Duration,
}

impl ReadinessEvaluator {
    pub fn new(state: ReadinessState, interval: Duration) -> Self {
        Self {
            probes: Vec::new(),
            state,
            interval,
        }
    }

    /// Append a probe to the set
    ///
    /// Only valid before [`run`](Self::run); `run` consumes the evaluator, so
    /// the set is frozen once the loop starts.
    pub fn add_probe(&mut self, probe: Arc<dyn ReadinessProbe>) {
        self.probes.push(probe);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single pass and store the result
    pub async fn evaluate_once(&self) -> bool {
        let probes: Arc<[Arc<dyn ReadinessProbe>]> = self.probes.clone().into();
        pass(probes, &self.state).await
    }

    /// Evaluate until the shutdown signal fires
    ///
    /// The first pass runs immediately. A pass in progress is not interrupted;
    /// shutdown is observed between passes. On exit the state is set to not
    /// ready so polls during the shutdown grace period get 503.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let probes: Arc<[Arc<dyn ReadinessProbe>]> = self.probes.into();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            probes = probes.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Readiness evaluation started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {
                    pass(probes.clone(), &self.state).await;
                }
            }
        }

        self.state.set(false);
        info!("Readiness evaluation stopped");
    }
}

/// Evaluate on the blocking pool, then overwrite the shared state
async fn pass(probes: Arc<[Arc<dyn ReadinessProbe>]>, state: &ReadinessState) -> bool {
    let ready = match tokio::task::spawn_blocking(move || evaluate_probes(&probes)).await {
        Ok(ready) => ready,
        Err(e) => {
            error!(error = %e, "Readiness probe panicked, reporting not ready");
            false
        }
    };

    let previous = state.is_ready();
    state.set(ready);

    if previous != ready {
        info!(ready = ready, "Readiness changed");
    } else {
        debug!(ready = ready, "Readiness evaluated");
    }
    ready
}
