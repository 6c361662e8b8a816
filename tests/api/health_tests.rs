//! Health Check and Metrics Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::*;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let server = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_liveness_probe() {
    let server = test_server();

    let response = server.get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_memory_store() {
    let server = test_server();

    let response = server.get("/health/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"]["backend"], "memory");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_request_counter() {
    let server = test_server();
    server.get("/health").await;

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().contains("http_requests_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = test_server();

    server
        .get("/api/v1/nothing-here")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
