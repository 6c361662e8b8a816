//! User API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

// ============================================================================
// Create / fetch
// ============================================================================

#[tokio::test]
async fn test_create_user_returns_created_envelope() {
    let server = test_server();

    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "name": "Ada Lovelace",
            "email": "  Ada@Campus.EDU ",
            "bio": "Analytical engines",
            "pushToken": "ExponentPushToken[abc]",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "ada@campus.edu");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("pushToken").is_none());
}

#[tokio::test]
async fn test_create_user_reports_every_invalid_field() {
    let server = test_server();

    let response = server
        .post("/api/v1/users")
        .json(&json!({ "email": "not-an-email" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    let fields = error_fields(&body);
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"email".to_string()));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict_regardless_of_case() {
    let server = test_server();
    let email = unique_email();
    create(
        &server,
        "/api/v1/users",
        json!({ "name": "First", "email": email }),
    )
    .await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({ "name": "Second", "email": email.to_uppercase() }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_user_with_malformed_id_is_not_found() {
    let server = test_server();

    let response = server.get("/api/v1/users/not-a-snowflake").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/api/v1/users")
        .content_type("application/json")
        .bytes("{\"name\": ".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_update_only_touches_allow_listed_fields() {
    let server = test_server();
    let user_id = create_user(&server).await;
    let before: Value = server
        .get(&format!("/api/v1/users/{user_id}"))
        .await
        .json();

    let response = server
        .patch(&format!("/api/v1/users/{user_id}"))
        .json(&json!({ "bio": "Rowing club captain", "email": "hijack@campus.edu" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["bio"], "Rowing club captain");
    assert_eq!(body["data"]["email"], before["data"]["email"]);
}

#[tokio::test]
async fn test_blank_name_update_is_rejected() {
    let server = test_server();
    let user_id = create_user(&server).await;

    let response = server
        .patch(&format!("/api/v1/users/{user_id}"))
        .json(&json!({ "name": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["name".to_string()]);

    let response = server
        .patch(&format!("/api/v1/users/{user_id}"))
        .json(&json!({ "name": "  Ada Lovelace  " }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_put_is_accepted_for_update() {
    let server = test_server();
    let user_id = create_user(&server).await;

    server
        .put(&format!("/api/v1/users/{user_id}"))
        .json(&json!({ "major": "Physics" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_delete_user_then_fetch_is_not_found() {
    let server = test_server();
    let user_id = create_user(&server).await;

    let response = server.delete(&format!("/api/v1/users/{user_id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_none());

    server
        .get(&format!("/api/v1/users/{user_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Listing and pagination
// ============================================================================

#[tokio::test]
async fn test_list_users_pagination_metadata() {
    let server = test_server();
    for _ in 0..25 {
        create_user(&server).await;
    }

    let response = server
        .get("/api/v1/users")
        .add_query_param("page", 3)
        .add_query_param("limit", 10)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(5));
    assert_eq!(
        body["data"]["pagination"],
        json!({
            "page": 3,
            "limit": 10,
            "total": 25,
            "totalPages": 3,
            "hasNext": false,
            "hasPrev": true,
        })
    );
}

#[tokio::test]
async fn test_out_of_range_limit_is_validation_error() {
    let server = test_server();

    for limit in [0, 101] {
        let response = server
            .get("/api/v1/users")
            .add_query_param("limit", limit)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let server = test_server();
    create(
        &server,
        "/api/v1/users",
        json!({ "name": "Grace Hopper", "email": unique_email() }),
    )
    .await;
    create_user(&server).await;

    let response = server
        .get("/api/v1/users")
        .add_query_param("search", "HOPP")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Grace Hopper");
}

#[tokio::test]
async fn test_single_character_search_is_rejected() {
    let server = test_server();

    let response = server
        .get("/api/v1/users")
        .add_query_param("search", "a")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["search".to_string()]);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_counts_are_derived() {
    let server = test_server();
    let user_id = create_user(&server).await;
    let other = create_user(&server).await;

    create_event(&server, &user_id).await;
    let attending = create_event(&server, &other).await;
    server
        .post(&format!("/api/v1/events/{attending}/attend"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status_ok();

    let club_id = create_club(&server).await;
    server
        .post(&format!("/api/v1/clubs/{club_id}/officers"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status_ok();

    create_listing(&server, &user_id, 25.0).await;
    create_post(&server, &user_id).await;

    let response = server
        .get(&format!("/api/v1/users/{user_id}/profile"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["data"]["stats"],
        json!({
            "clubCount": 1,
            "officerCount": 1,
            "eventsHosted": 1,
            "eventsAttending": 1,
            "activeListings": 1,
            "postCount": 1,
        })
    );
}
