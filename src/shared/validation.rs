//! Validation Utilities
//!
//! Collects field errors from `validator` derives and from domain predicates
//! into one list so a request is rejected with every problem at once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::ValidationErrors;

use super::error::{AppError, FieldError};
use super::snowflake;

/// Accumulator for field-level errors of a single write request.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the outcome of a `validator` derive.
    pub fn from_validator(result: Result<(), ValidationErrors>) -> Self {
        let mut errors = Self::new();
        if let Err(e) = result {
            errors.errors = validator_field_errors(&e);
        }
        errors
    }

    /// Record an error for `field` carrying the offending value.
    pub fn add(&mut self, field: &str, message: impl Into<String>, value: impl Serialize) {
        self.errors.push(FieldError::new(field, message).with_value(value));
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    #[cfg(test)]
    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors))
        }
    }

    /// Parse an RFC 3339 timestamp, recording an error when malformed.
    pub fn timestamp(&mut self, field: &str, raw: &str) -> Option<DateTime<Utc>> {
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                self.add(field, format!("{} must be an ISO 8601 date-time", field), raw);
                None
            }
        }
    }

    /// Parse a document identifier supplied in a request body.
    pub fn identifier(&mut self, field: &str, raw: &str) -> Option<i64> {
        let parsed = snowflake::parse(raw);
        if parsed.is_none() {
            self.add(field, format!("{} must be a valid identifier", field), raw);
        }
        parsed
    }
}

/// Convert validation errors to a field error list, sorted by field name.
pub fn validator_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: camel_case(field),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", camel_case(field))),
                value: e.params.get("value").cloned(),
            })
        })
        .collect();

    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Trim a text field in place. Run before `validate()` so length rules
/// apply to the value that gets stored.
pub fn trim_field(value: &mut Option<String>) {
    if let Some(text) = value.as_mut() {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
}

/// `start_time` -> `startTime`, matching the JSON field names clients send.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
