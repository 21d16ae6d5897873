//! HTTP server for health endpoints
//!
//! Provides orchestration probes:
//! - `/health-check` - Liveness probe (process is running)
//! - `/ready-check` - Readiness probe (all registered probes report ready)
//!
//! Also provides graceful shutdown handling for SIGTERM/SIGINT.

pub mod config;
mod error;
mod health;
pub mod lifecycle;
pub mod probe;
pub mod readiness;
pub mod shutdown;

pub use config::{HealthCheckConfig, DEFAULT_GRACE_PERIOD, DEFAULT_LISTEN_ADDR};
pub use error::HealthCheckError;
pub use health::{build_router, HEALTH_CHECK_PATH, READY_CHECK_PATH};
pub use lifecycle::{FatalHandler, HealthCheck, LifecycleState, ShutdownOutcome};
pub use probe::{from_fn, FnProbe, ManualProbe, ReadinessProbe};
pub use readiness::{ReadinessEvaluator, ReadinessState, DEFAULT_EVALUATION_INTERVAL};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownController, ShutdownSignal};

#[cfg(test)]
#[path = "config_test.rs"]
mod config_tests;

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_tests;

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_tests;

#[cfg(test)]
#[path = "readiness_test.rs"]
mod readiness_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
