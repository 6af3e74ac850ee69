//! # Credential Newtypes
//!
//! Opaque bearer credentials issued by the identity provider. The access
//! token is short-lived and presented on every request; the refresh token is
//! long-lived and only ever travels in an HTTP-only cookie.
//!
//! Both types redact their value in `Debug` so a stray `{:?}` in a log line
//! cannot leak a credential.

use serde::{Deserialize, Serialize};

/// Short-lived bearer credential presented per request.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the value of an `Authorization` header.
    ///
    /// Takes the second space-separated segment, so `Bearer abc` yields
    /// `abc`. A header with no second segment carries no token.
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        header
            .split(' ')
            .nth(1)
            .filter(|t| !t.is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Long-lived credential exchanged for a new session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken([REDACTED])")
    }
}

/// The access/refresh pair issued together by a sign-in, verify or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Token the client presents as `Authorization: Bearer`.
    pub access_token: AccessToken,
    /// Token the server keeps in the `refresh_token` cookie.
    pub refresh_token: RefreshToken,
}
