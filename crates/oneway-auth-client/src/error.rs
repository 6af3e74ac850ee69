//! Auth provider client error types.

use oneway_core::StoreError;

use crate::types::ProviderErrorBody;

/// Errors from auth provider calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The provider returned a non-2xx status.
    #[error("auth provider {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl AuthApiError {
    /// Collapse into the store-level error for `operation`.
    ///
    /// Provider rejections keep their status and the provider's own message;
    /// everything else loses its detail to the `Display` text, which is only
    /// ever logged.
    pub fn into_store_error(self, operation: &'static str) -> StoreError {
        match self {
            Self::ApiError { status, body, .. } => StoreError::Rejected {
                operation,
                status,
                message: ProviderErrorBody::message_from(&body),
            },
            Self::Deserialization { .. } => StoreError::Malformed {
                operation,
                message: self.to_string(),
            },
            Self::Http { .. } | Self::Config(_) => StoreError::Transport {
                operation,
                message: self.to_string(),
            },
        }
    }
}
