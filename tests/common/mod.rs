//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure. Every test gets its own
//! router over a fresh in-memory store, so tests never see each other's data.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::StatusCode;
use axum_test::TestServer;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};

use campus_hub::config::{Settings, UploadSettings};
use campus_hub::startup::{build_router, AppState};

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Settings for a development-mode in-memory instance
pub fn test_settings() -> Settings {
    Settings {
        environment: "development".into(),
        uploads: UploadSettings {
            cloud_name: "campus-test".into(),
            api_key: "test-key".into(),
            api_secret: "test-secret".into(),
            ..UploadSettings::default()
        },
        ..Settings::default()
    }
}

/// Test server over a fresh in-memory store
pub fn test_server() -> TestServer {
    test_server_with(test_settings())
}

pub fn test_server_with(settings: Settings) -> TestServer {
    TestServer::new(build_router(AppState::in_memory(settings))).unwrap()
}

fn next_seq() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Email that no other fixture in this process will produce
pub fn unique_email() -> String {
    let first: String = FirstName().fake();
    let local: String = first
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase();
    format!("{}.{}@campus.edu", local, next_seq())
}

/// Club name that no other fixture in this process will produce
pub fn unique_club_name() -> String {
    let last: String = LastName().fake();
    format!("{} Society {}", last, next_seq())
}

pub fn user_body() -> Value {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    json!({
        "name": format!("{first} {last}"),
        "email": unique_email(),
        "major": "Computer Science",
    })
}

/// Event one day long, starting far in the future
pub fn event_body(host_id: &str) -> Value {
    json!({
        "title": "Spring Hackathon",
        "description": Sentence(3..8).fake::<String>(),
        "location": "Engineering Hall",
        "startTime": "2099-01-01T09:00:00Z",
        "endTime": "2099-01-01T17:00:00Z",
        "hostId": host_id,
    })
}

pub fn listing_body(seller_id: &str, price: f64) -> Value {
    json!({
        "title": "Calculus textbook",
        "description": "Lightly used, no highlights",
        "price": price,
        "sellerId": seller_id,
        "category": "books",
        "imageUrls": ["https://cdn.example.com/book.jpg"],
    })
}

pub fn post_body(author_id: &str) -> Value {
    json!({
        "content": Sentence(4..10).fake::<String>(),
        "authorId": author_id,
    })
}

/// POST a body and return `data.id` of the created document
pub async fn create(server: &TestServer, path: &str, body: Value) -> String {
    let response = server.post(path).json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    json["data"]["id"]
        .as_str()
        .expect("created document has an id")
        .to_string()
}

pub async fn create_user(server: &TestServer) -> String {
    create(server, "/api/v1/users", user_body()).await
}

pub async fn create_event(server: &TestServer, host_id: &str) -> String {
    create(server, "/api/v1/events", event_body(host_id)).await
}

pub async fn create_club(server: &TestServer) -> String {
    create(
        server,
        "/api/v1/clubs",
        json!({ "name": unique_club_name(), "description": "Weekly meetups" }),
    )
    .await
}

pub async fn create_listing(server: &TestServer, seller_id: &str, price: f64) -> String {
    create(server, "/api/v1/listings", listing_body(seller_id, price)).await
}

pub async fn create_post(server: &TestServer, author_id: &str) -> String {
    create(server, "/api/v1/posts", post_body(author_id)).await
}

/// IDs of the user summaries in an expanded reference list
pub fn ids(list: &Value) -> Vec<String> {
    strings_at(list, "id")
}

/// Field names reported in an error envelope
pub fn error_fields(body: &Value) -> Vec<String> {
    strings_at(&body["errors"], "field")
}

fn strings_at(list: &Value, key: &str) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item[key].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
