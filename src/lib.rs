//! Process-embedded liveness and readiness endpoint
//!
//! Serves `/health-check` (liveness) and `/ready-check` (aggregate of the
//! registered readiness probes) for load balancers and cluster schedulers.

pub mod server;
