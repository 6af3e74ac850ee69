//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and a helper
//! to extract + validate JSON bodies in handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use oneway_core::ValidationError;
use serde_json::Value;

use crate::error::{AppError, FieldErrors};

/// Trait for raw request bodies that check their fields and convert into
/// the typed values a handler works with.
///
/// Implementations report every bad field, not just the first one.
pub trait Validate {
    /// The checked form of the request.
    type Valid;

    /// Validate every field. Returns the field-keyed errors on failure.
    fn validate(self) -> Result<Self::Valid, FieldErrors>;
}

/// Extract a JSON body, mapping deserialization errors to a body-level
/// [`AppError::Validation`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::Validation(FieldErrors::form(err.body_text())))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
///
/// Handlers should use:
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_validated_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T::Valid, AppError> {
    extract_json(result)?.validate().map_err(AppError::Validation)
}

/// Trim a raw string field, treating blank as absent.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read a request field that must be a JSON string when present.
///
/// DTO fields are kept as untyped [`Value`]s so a wrong type is reported
/// against the field rather than failing the whole body.
pub(crate) fn text(raw: Option<Value>) -> Result<Option<String>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::ExpectedString {
            received: json_type(&other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
