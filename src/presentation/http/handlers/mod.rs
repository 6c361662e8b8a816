//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod club;
pub mod event;
pub mod health;
pub mod listing;
pub mod post;
pub mod upload;
pub mod user;
