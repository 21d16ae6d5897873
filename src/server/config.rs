//! Health check configuration
//!
//! Library users build [`HealthCheckConfig`] directly; [`HealthCheckConfig::from_env`]
//! is a convenience for standalone deployments.

use crate::server::readiness::DEFAULT_EVALUATION_INTERVAL;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Default listen address for the health endpoints
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);

/// Default time allowed for in-flight requests to finish on shutdown
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

pub const LISTEN_ADDR_ENV: &str = "HEALTHCHECK_LISTEN_ADDR";
pub const INTERVAL_ENV: &str = "HEALTHCHECK_INTERVAL_MS";
pub const GRACE_PERIOD_ENV: &str = "HEALTHCHECK_GRACE_PERIOD_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckConfig {
    /// Address the health endpoints bind to
    pub listen_addr: SocketAddr,
    /// Time between readiness evaluation passes
    pub evaluation_interval: Duration,
    /// Bound on draining in-flight requests after shutdown is signaled
    pub grace_period: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            evaluation_interval: DEFAULT_EVALUATION_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl HealthCheckConfig {
    /// Load configuration from environment variables
    ///
    /// Missing variables use defaults. Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup(LISTEN_ADDR_ENV) {
            Some(raw) => raw.trim().parse::<SocketAddr>().unwrap_or_else(|e| {
                warn!(
                    key = LISTEN_ADDR_ENV,
                    value = %raw,
                    error = %e,
                    "Invalid listen address, using default"
                );
                defaults.listen_addr
            }),
            None => defaults.listen_addr,
        };

        Self {
            listen_addr,
            evaluation_interval: duration_millis(&lookup, INTERVAL_ENV)
                .unwrap_or(defaults.evaluation_interval),
            grace_period: duration_millis(&lookup, GRACE_PERIOD_ENV)
                .unwrap_or(defaults.grace_period),
        }
    }
}

/// Parse a positive millisecond count
fn duration_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!(key = key, "Duration must be positive, using default");
            None
        }
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!(key = key, value = %raw, error = %e, "Invalid duration, using default");
            None
        }
    }
}
