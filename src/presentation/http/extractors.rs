//! Custom Extractors
//!
//! JSON and query extractors whose rejections render through `AppError`, so
//! a malformed body or query string gets the same envelope as any other
//! validation failure.

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    FromRequest, FromRequestParts,
};

use crate::shared::error::AppError;
use crate::shared::snowflake;

/// `axum::Json` with an enveloped rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with an enveloped rejection
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Expected a JSON request body".into())
            }
            other => AppError::invalid_field("body", other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_field("query", rejection.body_text())
    }
}

/// Parse a path identifier. A malformed ID cannot name any document, so it
/// is reported as not found rather than as a bad request.
pub fn parse_id(raw: &str, resource: &str) -> Result<i64, AppError> {
    snowflake::parse(raw).ok_or_else(|| AppError::NotFound(format!("{resource} not found")))
}
