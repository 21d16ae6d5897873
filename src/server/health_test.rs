//! Tests for health endpoints

use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

async fn send(readiness: &ReadinessState, method: Method, uri: &str) -> (StatusCode, usize) {
    let app = build_router(readiness.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    (status, body.len())
}

/// Test that /health-check returns 200 with an empty body
#[tokio::test]
async fn test_health_check_returns_200() {
    let readiness = ReadinessState::new();

    let (status, body_len) = send(&readiness, Method::GET, HEALTH_CHECK_PATH).await;

    assert_eq!(status, StatusCode::OK, "Liveness probe should return 200");
    assert_eq!(body_len, 0, "Liveness body should be empty");
}

/// Liveness does not depend on readiness
#[tokio::test]
async fn test_health_check_ignores_readiness() {
    let readiness = ReadinessState::new();
    readiness.set(true);
    assert_eq!(
        send(&readiness, Method::GET, HEALTH_CHECK_PATH).await.0,
        StatusCode::OK
    );

    readiness.set(false);
    assert_eq!(
        send(&readiness, Method::GET, HEALTH_CHECK_PATH).await.0,
        StatusCode::OK
    );
}

/// Test that /ready-check returns 503 when not ready
#[tokio::test]
async fn test_ready_check_returns_503_when_not_ready() {
    let readiness = ReadinessState::new();
    assert!(!readiness.is_ready(), "Should start as not ready");

    let (status, body_len) = send(&readiness, Method::GET, READY_CHECK_PATH).await;

    assert_eq!(
        status,
        StatusCode::SERVICE_UNAVAILABLE,
        "Readiness probe should return 503 when not ready"
    );
    assert_eq!(body_len, 0);
}

/// Test that /ready-check returns 200 when ready
#[tokio::test]
async fn test_ready_check_returns_200_when_ready() {
    let readiness = ReadinessState::new();
    readiness.set(true);

    let (status, body_len) = send(&readiness, Method::GET, READY_CHECK_PATH).await;

    assert_eq!(
        status,
        StatusCode::OK,
        "Readiness probe should return 200 when ready"
    );
    assert_eq!(body_len, 0);
}

/// The handler reads the shared state on every request
#[tokio::test]
async fn test_ready_check_follows_state_changes() {
    let readiness = ReadinessState::new();

    readiness.set(true);
    assert_eq!(
        send(&readiness, Method::GET, READY_CHECK_PATH).await.0,
        StatusCode::OK
    );

    readiness.set(false);
    assert_eq!(
        send(&readiness, Method::GET, READY_CHECK_PATH).await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let readiness = ReadinessState::new();

    let (status, _) = send(&readiness, Method::GET, "/healthz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_get_returns_405() {
    let readiness = ReadinessState::new();

    let (status, _) = send(&readiness, Method::POST, READY_CHECK_PATH).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
