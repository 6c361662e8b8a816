//! Signed Upload API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use campus_hub::application::services::upload_service::sign;
use campus_hub::config::Settings;

use crate::common::*;

#[tokio::test]
async fn test_signature_matches_configured_secret() {
    let server = test_server();

    let response = server
        .post("/api/v1/uploads/signature")
        .json(&json!({ "folder": "listings" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["folder"], "listings");
    assert_eq!(data["apiKey"], "test-key");
    assert_eq!(data["cloudName"], "campus-test");
    let timestamp = data["timestamp"].as_i64().unwrap();
    assert_eq!(
        data["signature"],
        sign("listings", timestamp, "test-secret").as_str()
    );
}

#[tokio::test]
async fn test_default_folder_is_used() {
    let server = test_server();

    let body: Value = server
        .post("/api/v1/uploads/signature")
        .json(&json!({}))
        .await
        .json();

    assert_eq!(body["data"]["folder"], "campus-hub");
}

#[tokio::test]
async fn test_unconfigured_uploads_are_internal_error() {
    let server = test_server_with(Settings::default());

    let response = server
        .post("/api/v1/uploads/signature")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], false);
}
