//! REST API tests against the in-memory store

mod club_tests;
mod event_tests;
mod health_tests;
mod listing_tests;
mod post_tests;
mod upload_tests;
mod user_tests;
