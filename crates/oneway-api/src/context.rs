//! # Request Context
//!
//! The per-request record of who is calling. The session gate builds one
//! [`RequestContext`] per request and stores it in the request extensions;
//! handlers read it back through the `FromRequestParts` impl. It is never
//! mutated after construction and never shared between requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use oneway_core::{AccessToken, Identity};

use crate::error::{AppError, AUTH_FAILED};

/// Resolved caller identity for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<Identity>,
    access_token: Option<AccessToken>,
}

impl RequestContext {
    /// Context for a caller the gate has authenticated.
    ///
    /// `access_token` is the token the caller presented, even when the
    /// session was refreshed on the way in.
    pub fn authenticated(user: Identity, access_token: AccessToken) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
        }
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    /// The access token presented with this request.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// The authenticated user together with their access token, or 401.
    pub fn require_user(&self) -> Result<(&Identity, &AccessToken), AppError> {
        match (&self.user, &self.access_token) {
            (Some(user), Some(token)) => Ok((user, token)),
            _ => Err(AppError::Unauthenticated(AUTH_FAILED.into())),
        }
    }
}

/// Extracts the context the session gate injected into extensions.
/// Returns 401 if none is present (the route is not behind the gate).
impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated(AUTH_FAILED.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oneway_core::UserId;

    fn identity() -> Identity {
        Identity {
            id: UserId::from_uuid(uuid::Uuid::nil()),
            email: None,
            phone: Some("233241234567".into()),
            role: Some("authenticated".into()),
            created_at: Utc::now(),
            last_sign_in_at: None,
        }
    }

    #[test]
    fn authenticated_context_exposes_user_and_token() {
        let ctx = RequestContext::authenticated(identity(), AccessToken::new("at"));
        let (user, token) = ctx.require_user().unwrap();
        assert_eq!(user.phone.as_deref(), Some("233241234567"));
        assert_eq!(token.as_str(), "at");
    }

    #[test]
    fn default_context_has_no_user() {
        let ctx = RequestContext::default();
        assert!(ctx.user().is_none());
        assert!(ctx.access_token().is_none());
        assert!(matches!(ctx.require_user(), Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn extractor_rejects_when_gate_did_not_run() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let result = RequestContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn extractor_returns_injected_context() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let ctx = RequestContext::authenticated(identity(), AccessToken::new("at"));
        parts.extensions.insert(ctx.clone());
        let extracted = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, ctx);
    }
}
