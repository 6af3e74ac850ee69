//! # Error Hierarchy
//!
//! Structured error types built with `thiserror`. No `Box<dyn Error>`, no
//! `.unwrap()` outside tests.

use thiserror::Error;

/// Validation errors for request primitives.
///
/// The `Display` text is what a client sees next to the offending field, so
/// it names the expected format rather than echoing the input back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field was sent with a JSON type other than string.
    #[error("Expected string, received {received}")]
    ExpectedString {
        /// JSON type actually sent, e.g. `number`.
        received: &'static str,
    },

    /// Phone number does not look like a dialable number.
    #[error("Invalid phone number")]
    InvalidPhone,

    /// Email address is not of the form `local@domain.tld`.
    #[error("Invalid email")]
    InvalidEmail,

    /// One-time code is not exactly six ASCII digits.
    #[error("Token must be a 6 digit number")]
    InvalidOtpCode,

    /// OTP delivery channel is not one of the supported channels.
    #[error("Invalid enum value. Expected 'sms' | 'whatsapp', received '{0}'")]
    InvalidChannel(String),

    /// OTP verification type is not one of the supported types.
    #[error("Invalid enum value. Expected 'sms' | 'phone_change', received '{0}'")]
    InvalidOtpType(String),
}

/// Failure reported by a [`SessionStore`](crate::SessionStore) call.
///
/// `Rejected` is the provider answering with an error of its own; the other
/// variants mean the call never produced a usable answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The identity provider answered with a non-success status.
    #[error("auth provider rejected {operation} ({status}): {message}")]
    Rejected {
        /// Store operation that was attempted, e.g. `"refresh_session"`.
        operation: &'static str,
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider-supplied message, safe to surface to clients.
        message: String,
    },

    /// The request did not reach the provider or the connection failed.
    #[error("transport error calling {operation}: {message}")]
    Transport {
        /// Store operation that was attempted.
        operation: &'static str,
        /// Transport-level detail. Never surfaced to clients.
        message: String,
    },

    /// The provider answered but the payload could not be understood.
    #[error("malformed response from {operation}: {message}")]
    Malformed {
        /// Store operation that was attempted.
        operation: &'static str,
        /// Decoder detail. Never surfaced to clients.
        message: String,
    },
}

impl StoreError {
    /// Provider status code, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Malformed { .. } => None,
        }
    }

    /// The provider's own message for a rejection.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether the provider said the credentials presented are no longer
    /// (or never were) valid.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
