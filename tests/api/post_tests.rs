//! Post and Comment API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

#[tokio::test]
async fn test_toggle_like_twice_restores_state() {
    let server = test_server();
    let author = create_user(&server).await;
    let fan = create_user(&server).await;
    let post_id = create_post(&server, &author).await;
    let like = format!("/api/v1/posts/{post_id}/like");

    let first: Value = server.post(&like).json(&json!({ "userId": fan })).await.json();
    assert_eq!(first["data"], json!({ "liked": true, "likeCount": 1 }));

    let second: Value = server.post(&like).json(&json!({ "userId": fan })).await.json();
    assert_eq!(second["data"], json!({ "liked": false, "likeCount": 0 }));

    let post: Value = server
        .get(&format!("/api/v1/posts/{post_id}"))
        .await
        .json();
    assert_eq!(post["data"]["likeCount"], 0);
    assert_eq!(post["data"]["likes"], json!([]));
}

#[tokio::test]
async fn test_like_by_unknown_user_is_not_found() {
    let server = test_server();
    let author = create_user(&server).await;
    let post_id = create_post(&server, &author).await;

    server
        .post(&format!("/api/v1/posts/{post_id}/like"))
        .json(&json!({ "userId": "999999999999" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_and_remove_comment() {
    let server = test_server();
    let author = create_user(&server).await;
    let commenter = create_user(&server).await;
    let post_id = create_post(&server, &author).await;

    let response = server
        .post(&format!("/api/v1/posts/{post_id}/comments"))
        .json(&json!({ "userId": commenter, "content": "  See you there!  " }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let comments = &body["data"]["comments"];
    assert_eq!(comments[0]["content"], "See you there!");
    assert_eq!(comments[0]["author"]["id"], commenter.as_str());
    let comment_id = comments[0]["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/v1/posts/{post_id}/comments/{comment_id}"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["comments"], json!([]));

    // Removing it again changes nothing
    server
        .delete(&format!("/api/v1/posts/{post_id}/comments/{comment_id}"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_blank_or_long_comment_is_rejected() {
    let server = test_server();
    let author = create_user(&server).await;
    let post_id = create_post(&server, &author).await;
    let path = format!("/api/v1/posts/{post_id}/comments");

    server
        .post(&path)
        .json(&json!({ "userId": author, "content": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post(&path)
        .json(&json!({ "userId": author, "content": "x".repeat(501) }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_post_with_bad_image_url() {
    let server = test_server();
    let author = create_user(&server).await;
    let mut body = post_body(&author);
    body["imageUrl"] = json!("https://example.com/notes.pdf");

    let response = server.post("/api/v1/posts").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["imageUrl".to_string()]);
}

#[tokio::test]
async fn test_update_post_content() {
    let server = test_server();
    let author = create_user(&server).await;
    let post_id = create_post(&server, &author).await;

    let response = server
        .patch(&format!("/api/v1/posts/{post_id}"))
        .json(&json!({ "content": "Edited announcement" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["content"], "Edited announcement");
}

#[tokio::test]
async fn test_blank_content_is_rejected_on_create_and_update() {
    let server = test_server();
    let author = create_user(&server).await;
    let mut body = post_body(&author);
    body["content"] = json!("   ");

    let response = server.post("/api/v1/posts").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["content".to_string()]);

    let post_id = create_post(&server, &author).await;
    server
        .patch(&format!("/api/v1/posts/{post_id}"))
        .json(&json!({ "content": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let stored: Value = server
        .get(&format!("/api/v1/posts/{post_id}"))
        .await
        .json();
    assert_ne!(stored["data"]["content"], "");
}

#[tokio::test]
async fn test_filter_posts_by_author_newest_first() {
    let server = test_server();
    let author = create_user(&server).await;
    let other = create_user(&server).await;
    let older = create_post(&server, &author).await;
    create_post(&server, &other).await;
    let newer = create_post(&server, &author).await;

    let body: Value = server
        .get("/api/v1/posts")
        .add_query_param("author", &author)
        .await
        .json();

    assert_eq!(ids(&body["data"]["items"]), vec![newer, older]);
}
