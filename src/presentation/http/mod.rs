//! HTTP API
//!
//! Routes, handlers and request extractors for the `/api/v1` surface.

pub mod extractors;
pub mod handlers;
pub mod routes;
