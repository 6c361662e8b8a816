//! Event API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

// ============================================================================
// Schedule validation
// ============================================================================

#[tokio::test]
async fn test_end_before_start_is_rejected() {
    let server = test_server();
    let host = create_user(&server).await;
    let mut body = event_body(&host);
    body["startTime"] = json!("2099-01-01T10:00:00Z");
    body["endTime"] = json!("2099-01-01T09:00:00Z");

    let response = server.post("/api/v1/events").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "endTime must be after startTime");
    assert_eq!(error_fields(&body), vec!["endTime".to_string()]);

    let list: Value = server.get("/api/v1/events").await.json();
    assert_eq!(list["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_event_in_the_past_is_rejected() {
    let server = test_server();
    let host = create_user(&server).await;
    let mut body = event_body(&host);
    body["startTime"] = json!("2001-01-01T10:00:00Z");
    body["endTime"] = json!("2001-01-01T12:00:00Z");

    let response = server.post("/api/v1/events").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(error_fields(&response.json()).contains(&"startTime".to_string()));
}

#[tokio::test]
async fn test_padded_short_title_is_rejected() {
    let server = test_server();
    let host = create_user(&server).await;
    let mut body = event_body(&host);
    body["title"] = json!("  ab  ");

    let response = server.post("/api/v1/events").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["title".to_string()]);
}

#[tokio::test]
async fn test_title_is_stored_trimmed() {
    let server = test_server();
    let host = create_user(&server).await;
    let mut body = event_body(&host);
    body["title"] = json!("  Open Mic Night  ");

    let response = server.post("/api/v1/events").json(&body).await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["title"], "Open Mic Night");

    let event_id = create_event(&server, &host).await;
    server
        .patch(&format!("/api/v1/events/{event_id}"))
        .json(&json!({ "title": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_host_is_not_found() {
    let server = test_server();

    let response = server
        .post("/api/v1/events")
        .json(&event_body("1234567890123"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_merges_schedule_with_stored_values() {
    let server = test_server();
    let host = create_user(&server).await;
    let event_id = create_event(&server, &host).await;

    // Stored start is 09:00, so an end of 08:00 must be rejected
    let response = server
        .patch(&format!("/api/v1/events/{event_id}"))
        .json(&json!({ "endTime": "2099-01-01T08:00:00Z" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .patch(&format!("/api/v1/events/{event_id}"))
        .json(&json!({ "endTime": "2099-01-01T20:00:00Z", "title": "Spring Hackathon II" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Spring Hackathon II");
}

// ============================================================================
// Attendance
// ============================================================================

#[tokio::test]
async fn test_attend_twice_is_conflict_and_count_stays_one() {
    let server = test_server();
    let host = create_user(&server).await;
    let attendee = create_user(&server).await;
    let event_id = create_event(&server, &host).await;
    let attend = format!("/api/v1/events/{event_id}/attend");

    let first = server.post(&attend).json(&json!({ "userId": attendee })).await;
    first.assert_status_ok();
    let body: Value = first.json();
    assert_eq!(body["data"]["attendeeCount"], 1);
    assert_eq!(ids(&body["data"]["attendees"]), vec![attendee.clone()]);

    let second = server.post(&attend).json(&json!({ "userId": attendee })).await;
    second.assert_status(StatusCode::CONFLICT);

    let event: Value = server
        .get(&format!("/api/v1/events/{event_id}"))
        .await
        .json();
    assert_eq!(event["data"]["attendeeCount"], 1);
}

#[tokio::test]
async fn test_host_cannot_attend_own_event() {
    let server = test_server();
    let host = create_user(&server).await;
    let event_id = create_event(&server, &host).await;

    server
        .post(&format!("/api/v1/events/{event_id}/attend"))
        .json(&json!({ "userId": host }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_leave_is_idempotent() {
    let server = test_server();
    let host = create_user(&server).await;
    let attendee = create_user(&server).await;
    let event_id = create_event(&server, &host).await;
    let attend = format!("/api/v1/events/{event_id}/attend");

    server
        .post(&attend)
        .json(&json!({ "userId": attendee }))
        .await
        .assert_status_ok();

    for _ in 0..2 {
        let response = server
            .delete(&attend)
            .json(&json!({ "userId": attendee }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["attendeeCount"], 0);
    }
}

#[tokio::test]
async fn test_attend_requires_user_id() {
    let server = test_server();
    let host = create_user(&server).await;
    let event_id = create_event(&server, &host).await;

    let response = server
        .post(&format!("/api/v1/events/{event_id}/attend"))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["userId".to_string()]);
}

#[tokio::test]
async fn test_deleted_attendee_is_omitted_from_expansion() {
    let server = test_server();
    let host = create_user(&server).await;
    let attendee = create_user(&server).await;
    let event_id = create_event(&server, &host).await;
    server
        .post(&format!("/api/v1/events/{event_id}/attend"))
        .json(&json!({ "userId": attendee }))
        .await
        .assert_status_ok();

    server
        .delete(&format!("/api/v1/users/{attendee}"))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/api/v1/users/{host}"))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/v1/events/{event_id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"]["host"].is_null());
    assert_eq!(body["data"]["attendees"], json!([]));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_filter_by_attendee_and_sort_order() {
    let server = test_server();
    let host = create_user(&server).await;
    let attendee = create_user(&server).await;

    let mut late = event_body(&host);
    late["title"] = json!("Late event");
    late["startTime"] = json!("2099-06-01T09:00:00Z");
    late["endTime"] = json!("2099-06-01T10:00:00Z");
    let late_id = create(&server, "/api/v1/events", late).await;
    let early_id = create_event(&server, &host).await;

    for id in [&late_id, &early_id] {
        server
            .post(&format!("/api/v1/events/{id}/attend"))
            .json(&json!({ "userId": attendee }))
            .await
            .assert_status_ok();
    }
    create_event(&server, &host).await;

    let ascending: Value = server
        .get("/api/v1/events")
        .add_query_param("attendee", &attendee)
        .await
        .json();
    assert_eq!(ids(&ascending["data"]["items"]), vec![early_id.clone(), late_id.clone()]);

    let descending: Value = server
        .get("/api/v1/events")
        .add_query_param("attendee", &attendee)
        .add_query_param("sort", "desc")
        .await
        .json();
    assert_eq!(ids(&descending["data"]["items"]), vec![late_id, early_id]);
}

#[tokio::test]
async fn test_delete_event() {
    let server = test_server();
    let host = create_user(&server).await;
    let event_id = create_event(&server, &host).await;

    let response = server.delete(&format!("/api/v1/events/{event_id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Event deleted");

    server
        .delete(&format!("/api/v1/events/{event_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
