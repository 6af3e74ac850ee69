//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every failure a handler or the session gate can produce is one variant of
//! [`AppError`]; failures reported by the identity provider pass through
//! [`classify`] exactly once on their way in.
//!
//! Two body shapes reach clients:
//!
//! ```text
//! { "error": { "statusCode": 401, "message": "No authorization key." } }
//! { "error": { "formErrors": [], "fieldErrors": { "token": ["Token must be a 6 digit number"] } } }
//! ```
//!
//! Internal error details are never exposed; they are logged instead.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oneway_core::{StoreError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when the provider rejects a credential without saying why.
pub const AUTH_FAILED: &str = "Authentication failed. Please log in again.";

/// Generic message returned for every 500.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// HTTP status code, repeated in the body for clients that only see JSON.
    pub status_code: u16,
    /// Human-readable error message.
    pub message: String,
}

/// Field-keyed validation failures.
///
/// `form_errors` holds problems with the body as a whole (unparseable JSON,
/// wrong content type); `field_errors` maps each offending field to its
/// messages. Serializes in the flattened shape web clients already parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// An empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error against `field`.
    pub fn single(field: &str, err: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push(field, err);
        errors
    }

    /// A single error against the body as a whole.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    /// Record an error against `field`.
    pub fn push(&mut self, field: &str, err: ValidationError) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(err.to_string());
    }

    /// Fold the outcome of one field check into this set, returning the
    /// value on success.
    pub fn check<T>(&mut self, field: &str, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(field, e);
                None
            }
        }
    }

    /// Whether no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(())` when empty, the collected errors otherwise.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request input (400).
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Missing, invalid or expired credentials (401).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Referenced resource absent (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Provider failure not covered by the variants above. Answered with the
    /// provider's status when it is a client or server error, 400 otherwise.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Anything unexpected (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => match StatusCode::from_u16(*status) {
                Ok(code) if code.is_client_error() || code.is_server_error() => code,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            Self::Validation(errors) => {
                return (status, Json(serde_json::json!({ "error": errors }))).into_response();
            }
            Self::Internal(cause) => {
                tracing::error!(error = %cause, "internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            Self::Upstream { status, message } => {
                tracing::warn!(status, error = %message, "auth provider error");
                message
            }
            Self::Unauthenticated(message) | Self::NotFound(message) => message,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                status_code: status.as_u16(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Classify a session store failure.
///
/// Credential rejections become `Unauthenticated`, a missing resource
/// becomes `NotFound`, other provider answers keep their status as
/// `Upstream`, and calls that never produced an answer are `Internal`.
pub fn classify(err: StoreError) -> AppError {
    if err.is_auth_rejection() {
        let message = err.provider_message().unwrap_or(AUTH_FAILED).to_string();
        return AppError::Unauthenticated(message);
    }
    match err {
        StoreError::Rejected {
            status: 404,
            message,
            ..
        } => AppError::NotFound(message),
        StoreError::Rejected {
            status, message, ..
        } => AppError::Upstream { status, message },
        other => AppError::Internal(other.to_string()),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        classify(err)
    }
}
