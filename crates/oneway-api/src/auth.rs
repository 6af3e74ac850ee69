//! # Session Gate
//!
//! Decides, per request, whether the caller holds a live session, and
//! silently renews it when only the refresh token is still good.
//!
//! ## Credentials
//!
//! ```text
//! Authorization: Bearer <access_token>   required
//! Cookie: refresh_token=<refresh_token>  optional, enables silent refresh
//! ```
//!
//! ## States
//!
//! ```text
//! START      -> REJECTED            no access token, no store call
//! START      -> LOOKUP
//! LOOKUP     -> AUTHORIZED          provider knows the session
//! LOOKUP     -> REFRESHING          no session (or rejected) and a refresh cookie
//! LOOKUP     -> REJECTED            no session and no refresh cookie
//! REFRESHING -> AUTHORIZED          refresh cookie rotated on the response
//! REFRESHING -> REJECTED
//! ```
//!
//! At most one lookup and one refresh per request, in that order. Nothing is
//! retried. A transport or decoding failure on either call is a 500.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use oneway_core::{AccessToken, RefreshToken, SessionStore, StoreError};

use crate::context::RequestContext;
use crate::cookies;
use crate::error::{AppError, AUTH_FAILED};
use crate::state::AppState;

/// Rejection when no bearer token was presented.
pub const NO_AUTHORIZATION_KEY: &str = "No authorization key.";

/// Rejection when the refresh token could not be exchanged.
pub const SESSION_EXPIRED: &str = "Session expired, please log in again.";

/// Credentials presented with a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
}

impl Credentials {
    /// Read the bearer token from `Authorization` and the refresh token from
    /// the cookie jar.
    pub fn from_request(headers: &HeaderMap, jar: &CookieJar) -> Self {
        Self {
            access_token: bearer_token(headers),
            refresh_token: cookies::refresh_token(jar),
        }
    }
}

/// Access token from the `Authorization` header, if one is present.
///
/// The token is the second space-separated segment; the scheme word itself
/// is not checked.
pub fn bearer_token(headers: &HeaderMap) -> Option<AccessToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(AccessToken::from_authorization_header)
}

/// Outcome of a successful authorization.
#[derive(Debug, Clone)]
pub struct Authorized {
    /// Context to attach to the request.
    pub context: RequestContext,
    /// Replacement refresh token to send back, set only when the session was
    /// refreshed.
    pub rotated: Option<RefreshToken>,
}

/// Run the gate for one request.
pub async fn authorize<S: SessionStore>(
    store: &S,
    credentials: Credentials,
) -> Result<Authorized, AppError> {
    let Some(access_token) = credentials.access_token else {
        tracing::warn!("authentication failed: missing authorization header");
        return Err(AppError::Unauthenticated(NO_AUTHORIZATION_KEY.into()));
    };

    match store.lookup_session(&access_token).await {
        Ok(Some(user)) => Ok(Authorized {
            context: RequestContext::authenticated(user, access_token),
            rotated: None,
        }),
        Ok(None) => match credentials.refresh_token {
            Some(refresh_token) => refresh(store, access_token, &refresh_token).await,
            None => {
                tracing::warn!("authentication failed: no active session and no refresh token");
                Err(AppError::Unauthenticated(AUTH_FAILED.into()))
            }
        },
        Err(err @ StoreError::Rejected { .. }) => match credentials.refresh_token {
            Some(refresh_token) => {
                tracing::debug!(error = %err, "session lookup rejected, attempting refresh");
                refresh(store, access_token, &refresh_token).await
            }
            None => {
                tracing::warn!(error = %err, "authentication failed: session lookup rejected");
                let message = err.provider_message().unwrap_or(AUTH_FAILED).to_string();
                Err(AppError::Unauthenticated(message))
            }
        },
        Err(err) => Err(AppError::Internal(err.to_string())),
    }
}

/// REFRESHING state: exchange the refresh token exactly once.
///
/// The caller keeps presenting `access_token` on this request; the access
/// token in the refreshed session is not handed back.
async fn refresh<S: SessionStore>(
    store: &S,
    access_token: AccessToken,
    refresh_token: &RefreshToken,
) -> Result<Authorized, AppError> {
    match store.refresh_session(refresh_token).await {
        Ok(session) => {
            tracing::info!(user_id = %session.identity.id, "session refreshed");
            Ok(Authorized {
                context: RequestContext::authenticated(session.identity, access_token),
                rotated: Some(session.credentials.refresh_token),
            })
        }
        Err(err @ StoreError::Rejected { .. }) => {
            tracing::warn!(error = %err, "authentication failed: refresh rejected");
            Err(AppError::Unauthenticated(SESSION_EXPIRED.into()))
        }
        Err(err) => Err(AppError::Internal(err.to_string())),
    }
}

/// End the caller's session.
///
/// Asks the store to revoke `access_token` when one was presented. A store
/// answer meaning the session is already gone counts as success, so calling
/// this twice looks the same to the client as calling it once. No context
/// outlives the call: the caller is left without a user.
pub async fn sign_out<S: SessionStore>(
    store: &S,
    access_token: Option<&AccessToken>,
) -> Result<(), AppError> {
    let Some(token) = access_token else {
        return Ok(());
    };
    match store.sign_out(token).await {
        Ok(()) => tracing::info!("session revoked"),
        Err(err) if err.is_auth_rejection() || err.status() == Some(404) => {
            tracing::debug!(error = %err, "session already revoked")
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Gate middleware for protected routes.
///
/// On success the [`RequestContext`] is injected into request extensions and,
/// if the session was refreshed, the rotated refresh cookie is added to the
/// handler's response.
pub async fn auth_middleware<S: SessionStore>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = Credentials::from_request(request.headers(), &jar);

    match authorize(state.store.as_ref(), credentials).await {
        Ok(Authorized { context, rotated }) => {
            request.extensions_mut().insert(context);
            let response = next.run(request).await;
            match rotated {
                Some(token) => {
                    let cookie = cookies::refresh_cookie(&token, state.config.secure_cookies);
                    (jar.add(cookie), response).into_response()
                }
                None => response,
            }
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_takes_second_segment() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap().as_str(), "abc.def");
    }

    #[test]
    fn bearer_token_missing_segment_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert!(bearer_token(&headers).is_none());
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn credentials_read_both_sources() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer at"));
        headers.insert(header::COOKIE, HeaderValue::from_static("refresh_token=rt"));
        let jar = CookieJar::from_headers(&headers);
        let creds = Credentials::from_request(&headers, &jar);
        assert_eq!(creds.access_token.unwrap().as_str(), "at");
        assert_eq!(creds.refresh_token.unwrap().as_str(), "rt");
    }
}
