//! Tests for health check configuration
//!
//! Parsing goes through `from_lookup` so tests never touch the process
//! environment.

use super::config::*;
use super::DEFAULT_EVALUATION_INTERVAL;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = HealthCheckConfig::default();

    assert_eq!(config.listen_addr.port(), 8080);
    assert!(config.listen_addr.ip().is_unspecified());
    assert_eq!(config.evaluation_interval, Duration::from_secs(1));
    assert_eq!(config.grace_period, Duration::from_secs(1));
}

#[test]
fn test_from_lookup_without_values_uses_defaults() {
    let config = HealthCheckConfig::from_lookup(lookup(&[]));

    assert_eq!(config, HealthCheckConfig::default());
}

#[test]
fn test_from_lookup_reads_all_values() {
    let config = HealthCheckConfig::from_lookup(lookup(&[
        (LISTEN_ADDR_ENV, "127.0.0.1:9090"),
        (INTERVAL_ENV, "250"),
        (GRACE_PERIOD_ENV, " 5000 "),
    ]));

    assert_eq!(config.listen_addr, "127.0.0.1:9090".parse().unwrap());
    assert_eq!(config.evaluation_interval, Duration::from_millis(250));
    assert_eq!(config.grace_period, Duration::from_secs(5));
}

#[test]
fn test_from_lookup_invalid_values_fall_back() {
    let config = HealthCheckConfig::from_lookup(lookup(&[
        (LISTEN_ADDR_ENV, ":8080"),
        (INTERVAL_ENV, "soon"),
        (GRACE_PERIOD_ENV, "-1"),
    ]));

    assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(config.evaluation_interval, DEFAULT_EVALUATION_INTERVAL);
    assert_eq!(config.grace_period, DEFAULT_GRACE_PERIOD);
}

#[test]
fn test_from_lookup_zero_durations_fall_back() {
    let config =
        HealthCheckConfig::from_lookup(lookup(&[(INTERVAL_ENV, "0"), (GRACE_PERIOD_ENV, "0")]));

    assert_eq!(config.evaluation_interval, DEFAULT_EVALUATION_INTERVAL);
    assert_eq!(config.grace_period, DEFAULT_GRACE_PERIOD);
}
