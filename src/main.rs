use healthcheck::server::{
    shutdown_channel, wait_for_signal, HealthCheck, HealthCheckConfig, ManualProbe,
};
use tokio_util::task::TaskTracker;
use tracing::{error, info};

/// Name of the probe that gates readiness on process startup
const STARTUP_PROBE: &str = "startup";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting health check endpoint");

    let config = HealthCheckConfig::from_env();
    info!(
        addr = %config.listen_addr,
        interval_ms = config.evaluation_interval.as_millis() as u64,
        grace_period_ms = config.grace_period.as_millis() as u64,
        "Configuration loaded"
    );

    // Create shutdown channel for coordinated shutdown
    let (shutdown_controller, shutdown_signal) = shutdown_channel();

    // Completion barrier for the serve activity
    let tracker = TaskTracker::new();

    let startup = ManualProbe::new(STARTUP_PROBE);

    let listen_addr = config.listen_addr;
    let mut health_check = HealthCheck::with_config(config);
    health_check.init(listen_addr, tracker.clone())?;
    health_check.add_readiness_probe(startup.clone())?;
    health_check.run(shutdown_signal)?;

    // Nothing else to warm up in the standalone process
    startup.set_ready(true);

    match wait_for_signal().await {
        Ok(signal) => info!(signal = signal, "Initiating graceful shutdown"),
        Err(e) => error!(error = %e, "Failed to listen for termination signals, shutting down"),
    }

    shutdown_controller.shutdown();

    tracker.close();
    tracker.wait().await;

    info!("Health check endpoint shut down gracefully");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
