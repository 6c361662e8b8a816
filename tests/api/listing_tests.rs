//! Marketplace Listing API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

#[tokio::test]
async fn test_eleven_images_rejected_before_persistence() {
    let server = test_server();
    let seller = create_user(&server).await;
    let mut body = listing_body(&seller, 40.0);
    body["imageUrls"] = json!((0..11)
        .map(|i| format!("https://cdn.example.com/photo-{i}.jpg"))
        .collect::<Vec<_>>());

    let response = server.post("/api/v1/listings").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(error_fields(&response.json()).contains(&"imageUrls".to_string()));

    let list: Value = server
        .get("/api/v1/listings")
        .add_query_param("seller", &seller)
        .await
        .json();
    assert_eq!(list["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_negative_price_and_bad_category_reported_together() {
    let server = test_server();
    let seller = create_user(&server).await;
    let mut body = listing_body(&seller, -1.0);
    body["category"] = json!("vehicles");

    let response = server.post("/api/v1/listings").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Validation failed");
    let fields = error_fields(&body);
    assert!(fields.contains(&"price".to_string()));
    assert!(fields.contains(&"category".to_string()));
}

#[tokio::test]
async fn test_padded_short_title_is_rejected() {
    let server = test_server();
    let seller = create_user(&server).await;
    let mut body = listing_body(&seller, 5.0);
    body["title"] = json!("  ab  ");

    let response = server.post("/api/v1/listings").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&response.json()), vec!["title".to_string()]);
}

#[tokio::test]
async fn test_created_listing_expands_seller() {
    let server = test_server();
    let seller = create_user(&server).await;

    let response = server
        .post("/api/v1/listings")
        .json(&listing_body(&seller, 12.5))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["seller"]["id"], seller.as_str());
    assert_eq!(body["data"]["isAvailable"], true);
    assert_eq!(body["data"]["category"], "books");
}

#[tokio::test]
async fn test_mark_sold_twice_is_conflict() {
    let server = test_server();
    let seller = create_user(&server).await;
    let listing_id = create_listing(&server, &seller, 30.0).await;
    let sold = format!("/api/v1/listings/{listing_id}/sold");

    let response = server.post(&sold).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["isAvailable"], false);

    server.post(&sold).await.assert_status(StatusCode::CONFLICT);

    server
        .post(&format!("/api/v1/listings/{listing_id}/available"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_browse_hides_sold_listings_by_default() {
    let server = test_server();
    let seller = create_user(&server).await;
    let active = create_listing(&server, &seller, 10.0).await;
    let sold = create_listing(&server, &seller, 20.0).await;
    server
        .post(&format!("/api/v1/listings/{sold}/sold"))
        .await
        .assert_status_ok();

    let available: Value = server.get("/api/v1/listings").await.json();
    assert_eq!(ids(&available["data"]["items"]), vec![active]);

    let sold_only: Value = server
        .get("/api/v1/listings")
        .add_query_param("available", false)
        .await
        .json();
    assert_eq!(ids(&sold_only["data"]["items"]), vec![sold]);
}

#[tokio::test]
async fn test_price_range_filter() {
    let server = test_server();
    let seller = create_user(&server).await;
    create_listing(&server, &seller, 5.0).await;
    let mid = create_listing(&server, &seller, 50.0).await;
    create_listing(&server, &seller, 500.0).await;

    let body: Value = server
        .get("/api/v1/listings")
        .add_query_param("minPrice", 10)
        .add_query_param("maxPrice", 100)
        .await
        .json();

    assert_eq!(ids(&body["data"]["items"]), vec![mid]);
}

#[tokio::test]
async fn test_inverted_price_range_is_rejected() {
    let server = test_server();

    let response = server
        .get("/api/v1/listings")
        .add_query_param("minPrice", 100)
        .add_query_param("maxPrice", 10)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_with_too_many_images_leaves_listing_unchanged() {
    let server = test_server();
    let seller = create_user(&server).await;
    let listing_id = create_listing(&server, &seller, 30.0).await;
    let images: Vec<String> = (0..11)
        .map(|i| format!("https://cdn.example.com/{i}.png"))
        .collect();

    server
        .put(&format!("/api/v1/listings/{listing_id}"))
        .json(&json!({ "imageUrls": images, "price": 35.0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let body: Value = server
        .get(&format!("/api/v1/listings/{listing_id}"))
        .await
        .json();
    assert_eq!(body["data"]["price"], 30.0);
    assert_eq!(body["data"]["imageUrls"].as_array().map(Vec::len), Some(1));
}
