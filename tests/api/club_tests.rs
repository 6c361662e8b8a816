//! Club API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

fn club_path(club_id: &str, rest: &str) -> String {
    format!("/api/v1/clubs/{club_id}{rest}")
}

async fn join(server: &axum_test::TestServer, club_id: &str, user_id: &str) {
    server
        .post(&club_path(club_id, "/join"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Roster
// ============================================================================

#[tokio::test]
async fn test_add_officer_on_non_member_enrolls_both() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;

    let response = server
        .post(&club_path(&club_id, "/officers"))
        .json(&json!({ "userId": user_id }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body["data"]["members"]), vec![user_id.clone()]);
    assert_eq!(ids(&body["data"]["officers"]), vec![user_id]);
    assert_eq!(body["data"]["memberCount"], 1);
}

#[tokio::test]
async fn test_add_officer_is_idempotent() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;

    for _ in 0..2 {
        server
            .post(&club_path(&club_id, "/officers"))
            .json(&json!({ "userId": user_id }))
            .await
            .assert_status_ok();
    }

    let club: Value = server.get(&club_path(&club_id, "")).await.json();
    assert_eq!(ids(&club["data"]["officers"]).len(), 1);
    assert_eq!(ids(&club["data"]["members"]).len(), 1);
}

#[tokio::test]
async fn test_remove_member_who_is_officer_clears_both() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let officer = create_user(&server).await;
    let member = create_user(&server).await;
    join(&server, &club_id, &member).await;
    server
        .post(&club_path(&club_id, "/officers"))
        .json(&json!({ "userId": officer }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&club_path(&club_id, &format!("/members/{officer}")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body["data"]["members"]), vec![member]);
    assert_eq!(body["data"]["officers"], json!([]));
}

#[tokio::test]
async fn test_join_twice_is_conflict() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;
    join(&server, &club_id, &user_id).await;

    server
        .post(&club_path(&club_id, "/join"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_leave_when_not_member_is_not_found() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;

    server
        .delete(&club_path(&club_id, "/leave"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_drops_officer_status() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;
    server
        .post(&club_path(&club_id, "/officers"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&club_path(&club_id, "/leave"))
        .json(&json!({ "userId": user_id }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["members"], json!([]));
    assert_eq!(body["data"]["officers"], json!([]));
}

#[tokio::test]
async fn test_remove_officer_keeps_membership() {
    let server = test_server();
    let club_id = create_club(&server).await;
    let user_id = create_user(&server).await;
    server
        .post(&club_path(&club_id, "/officers"))
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&club_path(&club_id, &format!("/officers/{user_id}")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(ids(&body["data"]["members"]), vec![user_id]);
    assert_eq!(body["data"]["officers"], json!([]));
}

// ============================================================================
// Create / update
// ============================================================================

#[tokio::test]
async fn test_create_with_officer_outside_members_is_rejected() {
    let server = test_server();
    let member = create_user(&server).await;
    let outsider = create_user(&server).await;

    let response = server
        .post("/api/v1/clubs")
        .json(&json!({
            "name": unique_club_name(),
            "members": [member],
            "officers": [outsider],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(error_fields(&response.json()).contains(&"officers".to_string()));
}

#[tokio::test]
async fn test_duplicate_club_name_is_conflict() {
    let server = test_server();
    let name = unique_club_name();
    create(&server, "/api/v1/clubs", json!({ "name": name })).await;

    server
        .post("/api/v1/clubs")
        .json(&json!({ "name": name.to_lowercase() }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rename_to_taken_name_is_conflict() {
    let server = test_server();
    let taken = unique_club_name();
    create(&server, "/api/v1/clubs", json!({ "name": taken })).await;
    let club_id = create_club(&server).await;

    server
        .patch(&club_path(&club_id, ""))
        .json(&json!({ "name": taken }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_filter_clubs_by_member() {
    let server = test_server();
    let user_id = create_user(&server).await;
    let mine = create_club(&server).await;
    create_club(&server).await;
    join(&server, &mine, &user_id).await;

    let body: Value = server
        .get("/api/v1/clubs")
        .add_query_param("member", &user_id)
        .await
        .json();

    assert_eq!(ids(&body["data"]["items"]), vec![mine]);
}

#[tokio::test]
async fn test_padded_short_name_is_rejected() {
    let server = test_server();

    let response = server
        .post("/api/v1/clubs")
        .json(&json!({ "name": "  ab  " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["name".to_string()]);

    let club_id = create_club(&server).await;
    server
        .patch(&club_path(&club_id, ""))
        .json(&json!({ "name": " x " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
