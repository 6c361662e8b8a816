//! Application Error Types
//!
//! Centralized error handling with Axum integration. Every failure leaves the
//! service as one of four kinds: validation (400), not found (404), conflict
//! (409) or internal (500), wrapped in the uniform response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::Serialize;

/// Whether internal error details are rendered into response bodies.
/// Set once at startup; only enabled in the development environment.
static EXPOSE_INTERNAL_ERRORS: OnceCell<bool> = OnceCell::new();

/// Enable or disable internal error details in responses.
pub fn expose_internal_errors(enabled: bool) {
    let _ = EXPOSE_INTERNAL_ERRORS.set(enabled);
}

fn internal_details_exposed() -> bool {
    EXPOSE_INTERNAL_ERRORS.get().copied().unwrap_or(false)
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl AppError {
    /// Build a validation error from a list of field errors.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        let message = match errors.as_slice() {
            [single] => single.message.clone(),
            _ => "Validation failed".to_string(),
        };
        AppError::Validation { message, errors }
    }

    /// Build a validation error for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            value: None,
        }
    }

    /// Attach the offending value.
    pub fn with_value(mut self, value: impl Serialize) -> Self {
        self.value = serde_json::to_value(value).ok();
        self
    }
}

/// Error response body (the failure shape of the response envelope)
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("Document not found".into()),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => {
                        AppError::Conflict(unique_violation_message(&constraint).into())
                    }
                    sqlx::error::ErrorKind::CheckViolation => {
                        let (field, message) = check_violation_detail(&constraint);
                        AppError::invalid_field(field, message)
                    }
                    _ => AppError::Database(e),
                }
            }
            _ => AppError::Database(e),
        }
    }
}

fn unique_violation_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_unique" => "A user with this email already exists",
        "clubs_name_unique" => "A club with this name already exists",
        _ => "Document already exists",
    }
}

fn check_violation_detail(constraint: &str) -> (&'static str, &'static str) {
    match constraint {
        "events_end_after_start" => ("endTime", "endTime must be after startTime"),
        "clubs_officers_are_members" => ("officers", "Every officer must be a member"),
        "listings_image_limit" => ("imageUrls", "A listing can have at most 10 images"),
        "listings_price_non_negative" => ("price", "Price must be a non-negative number"),
        _ => ("document", "Document violates a store constraint"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                (msg, None)
            }
            AppError::Validation { message, errors } => (message, Some(errors)),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (internal_message(&msg), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (internal_message(&e.to_string()), None)
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

fn internal_message(detail: &str) -> String {
    if internal_details_exposed() {
        format!("Internal server error: {}", detail)
    } else {
        "Internal server error".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_with_single_error_uses_its_message() {
        let err = AppError::invalid_field("title", "Title must be 3-200 characters");
        match err {
            AppError::Validation { message, errors } => {
                assert_eq!(message, "Title must be 3-200 characters");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_with_many_errors_uses_generic_message() {
        let err = AppError::validation(vec![
            FieldError::new("title", "too short"),
            FieldError::new("price", "negative"),
        ]);
        assert!(matches!(err, AppError::Validation { ref message, .. } if message == "Validation failed"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_becomes_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_field_error_serializes_value_only_when_present() {
        let bare = serde_json::to_value(FieldError::new("name", "required")).unwrap();
        assert!(bare.get("value").is_none());

        let with_value =
            serde_json::to_value(FieldError::new("price", "negative").with_value(-3.5)).unwrap();
        assert_eq!(with_value["value"], serde_json::json!(-3.5));
    }
}
