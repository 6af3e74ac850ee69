//! # Identities and Sessions
//!
//! The identity provider owns users and sessions; these types are the
//! read-only view the API works with. The gate never persists either.
//!
//! ## New-user derivation
//!
//! A session is "new" when the provider reports a last sign-in within a short
//! window of account creation. The window depends on how the user signed in:
//! a password sign-in answers within seconds, while an OTP sign-in may take up
//! to the code's validity window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::CredentialPair;

/// Identity-provider user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a user identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller's identity as reported by the identity provider.
///
/// Unknown provider fields are ignored, so new provider releases do not break
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id.
    pub id: UserId,
    /// Email address, for users who signed up with one.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number, for users who signed up with OTP.
    #[serde(default)]
    pub phone: Option<String>,
    /// Provider-side role (e.g. `authenticated`).
    #[serde(default)]
    pub role: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the user last completed a sign-in.
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// How a session was obtained, which fixes the new-user window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMethod {
    /// Email + password sign-in.
    Password,
    /// Phone one-time-code verification.
    Otp,
}

impl SignInMethod {
    /// Maximum gap, in whole seconds, between account creation and last
    /// sign-in for the session to count as a first sign-in.
    pub const fn new_user_window_secs(self) -> i64 {
        match self {
            Self::Password => 10,
            // OTP validity window.
            Self::Otp => 60,
        }
    }
}

impl Identity {
    /// Whether this identity signed in for the first time.
    ///
    /// A missing `last_sign_in_at` means the provider has not recorded a
    /// prior sign-in, which counts as a gap of zero.
    pub fn is_new_user(&self, method: SignInMethod) -> bool {
        let last = self.last_sign_in_at.unwrap_or(self.created_at);
        (last - self.created_at).num_seconds() <= method.new_user_window_secs()
    }
}

/// A provider session: the identity plus the credentials that prove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Who the session belongs to.
    pub identity: Identity,
    /// Tokens issued for the session.
    pub credentials: CredentialPair,
}

impl Session {
    /// Whether the session's user signed in for the first time.
    pub fn is_new_user(&self, method: SignInMethod) -> bool {
        self.identity.is_new_user(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn identity_with_gap(secs: i64) -> Identity {
        let created = Utc.with_ymd_and_hms(2024, 12, 7, 9, 30, 36).unwrap();
        Identity {
            id: UserId::from_uuid(Uuid::nil()),
            email: None,
            phone: Some("+233123456789".into()),
            role: Some("authenticated".into()),
            created_at: created,
            last_sign_in_at: Some(created + Duration::seconds(secs)),
        }
    }

    #[test]
    fn password_window_is_ten_seconds() {
        assert!(identity_with_gap(5).is_new_user(SignInMethod::Password));
        assert!(identity_with_gap(10).is_new_user(SignInMethod::Password));
        assert!(!identity_with_gap(15).is_new_user(SignInMethod::Password));
    }

    #[test]
    fn otp_window_is_sixty_seconds() {
        assert!(identity_with_gap(59).is_new_user(SignInMethod::Otp));
        assert!(identity_with_gap(60).is_new_user(SignInMethod::Otp));
        assert!(!identity_with_gap(61).is_new_user(SignInMethod::Otp));
    }

    #[test]
    fn partial_seconds_are_truncated() {
        let mut identity = identity_with_gap(10);
        identity.last_sign_in_at = identity
            .last_sign_in_at
            .map(|t| t + Duration::milliseconds(900));
        assert!(identity.is_new_user(SignInMethod::Password));
    }

    #[test]
    fn missing_last_sign_in_counts_as_new() {
        let mut identity = identity_with_gap(0);
        identity.last_sign_in_at = None;
        assert!(identity.is_new_user(SignInMethod::Password));
    }

    #[test]
    fn identity_ignores_unknown_provider_fields() {
        let json = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "",
            "phone": "233123456789",
            "created_at": "2024-12-07T09:30:36.774Z",
            "last_sign_in_at": "2024-12-07T09:30:40.100Z",
            "app_metadata": {"provider": "phone"},
            "user_metadata": {}
        });
        let identity: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(
            identity.id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(identity.phone.as_deref(), Some("233123456789"));
        assert!(identity.is_new_user(SignInMethod::Password));
    }
}
