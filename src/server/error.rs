use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthCheckError {
    #[error("health check is already initialized")]
    AlreadyInitialized,

    #[error("health check must be initialized before it runs")]
    NotInitialized,

    #[error("health check is already running")]
    AlreadyRunning,

    #[error("readiness probes must be registered before the health check runs")]
    ProbeAfterRun,

    #[error("failed to bind health check listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("health check listener failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("health check listener closed without a shutdown request")]
    ListenerClosed,
}
