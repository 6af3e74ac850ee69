//! # oneway-auth-client -- Typed Rust client for the hosted auth provider
//!
//! The Oneway API delegates every identity concern (passwords, one-time
//! codes, sessions, refresh tokens) to the hosted Postgres backend's auth
//! service. This crate is the only path to that service; it implements
//! [`oneway_core::SessionStore`] so the API layer never touches HTTP
//! details.
//!
//! ## Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/auth/v1/user` | Resolve the session behind an access token |
//! | PUT    | `/auth/v1/user` | Update phone or password |
//! | POST   | `/auth/v1/token?grant_type=password` | Password sign-in |
//! | POST   | `/auth/v1/token?grant_type=refresh_token` | Refresh-token exchange |
//! | POST   | `/auth/v1/otp` | Send a one-time code |
//! | POST   | `/auth/v1/verify` | Verify a one-time code |
//! | POST   | `/auth/v1/logout` | Revoke a session |
//! | POST   | `/auth/v1/recover` | Send a password-recovery mail |
//!
//! Calls are never retried: a failed lookup or refresh is final for the
//! request that made it.

pub mod config;
pub mod error;
mod store;
pub mod types;

pub use config::AuthProviderConfig;
pub use error::AuthApiError;

use std::time::Duration;

use oneway_core::{
    AccessToken, EmailAddress, Identity, OtpChannel, OtpCode, OtpType, PhoneNumber, RefreshToken,
    Session,
};
use serde::de::DeserializeOwned;

use crate::types::{
    OtpRequest, PasswordGrant, RecoverRequest, RefreshGrant, TokenResponse, UpdateUserRequest,
    VerifyRequest,
};

/// Auth provider client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct AuthProviderClient {
    http: reqwest::Client,
    config: AuthProviderConfig,
}

impl AuthProviderClient {
    /// Create a new client from configuration.
    pub fn new(config: AuthProviderConfig) -> Result<Self, AuthApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let key = reqwest::header::HeaderValue::from_str(&config.service_key)
                    .map_err(|_| crate::config::ConfigError::InvalidKey)?;
                let bearer =
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.service_key))
                        .map_err(|_| crate::config::ConfigError::InvalidKey)?;
                headers.insert("apikey", key);
                // Per-request user tokens replace this default.
                headers.insert(reqwest::header::AUTHORIZATION, bearer);
                headers
            })
            .build()
            .map_err(|e| AuthApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// Resolve the user behind an access token.
    ///
    /// Calls `GET {base_url}/auth/v1/user`. A 401, 403 or 404 means the token
    /// no longer maps to a session and yields `Ok(None)`.
    pub async fn get_user(&self, access_token: &AccessToken) -> Result<Option<Identity>, AuthApiError> {
        let endpoint = "GET /user";
        let resp = self
            .http
            .get(self.config.endpoint("user"))
            .bearer_auth(access_token.as_str())
            .send()
            .await
            .map_err(|e| AuthApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if matches!(
            resp.status(),
            reqwest::StatusCode::UNAUTHORIZED
                | reqwest::StatusCode::FORBIDDEN
                | reqwest::StatusCode::NOT_FOUND
        ) {
            tracing::debug!(endpoint, status = resp.status().as_u16(), "no session for access token");
            return Ok(None);
        }

        decode(endpoint, check(endpoint, resp).await?).await.map(Some)
    }

    /// Email + password sign-in.
    ///
    /// Calls `POST {base_url}/auth/v1/token?grant_type=password`.
    pub async fn password_grant(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Session, AuthApiError> {
        let endpoint = "POST /token?grant_type=password";
        let body = PasswordGrant {
            email: email.as_str(),
            password,
        };
        let resp = self
            .post(endpoint, "token", &[("grant_type", "password")], &body)
            .await?;
        decode::<TokenResponse>(endpoint, resp).await.map(Session::from)
    }

    /// Exchange a refresh token for a new session.
    ///
    /// Calls `POST {base_url}/auth/v1/token?grant_type=refresh_token`.
    pub async fn refresh_grant(&self, refresh_token: &RefreshToken) -> Result<Session, AuthApiError> {
        let endpoint = "POST /token?grant_type=refresh_token";
        let body = RefreshGrant {
            refresh_token: refresh_token.as_str(),
        };
        let resp = self
            .post(endpoint, "token", &[("grant_type", "refresh_token")], &body)
            .await?;
        decode::<TokenResponse>(endpoint, resp).await.map(Session::from)
    }

    /// Send a one-time code to `phone` over `channel`.
    ///
    /// Calls `POST {base_url}/auth/v1/otp`. Unknown numbers are signed up.
    pub async fn send_otp(&self, phone: &PhoneNumber, channel: OtpChannel) -> Result<(), AuthApiError> {
        let endpoint = "POST /otp";
        let body = OtpRequest {
            phone: phone.as_str(),
            channel: channel.as_str(),
            create_user: true,
        };
        self.post(endpoint, "otp", &[], &body).await.map(|_| ())
    }

    /// Verify a one-time code.
    ///
    /// Calls `POST {base_url}/auth/v1/verify`.
    pub async fn verify(
        &self,
        phone: &PhoneNumber,
        token: &OtpCode,
        otp_type: OtpType,
    ) -> Result<Session, AuthApiError> {
        let endpoint = "POST /verify";
        let body = VerifyRequest {
            phone: phone.as_str(),
            token: token.as_str(),
            otp_type: otp_type.as_str(),
        };
        let resp = self.post(endpoint, "verify", &[], &body).await?;
        decode::<TokenResponse>(endpoint, resp).await.map(Session::from)
    }

    /// Revoke every session of the user behind `access_token`.
    ///
    /// Calls `POST {base_url}/auth/v1/logout?scope=global`.
    pub async fn logout(&self, access_token: &AccessToken) -> Result<(), AuthApiError> {
        let endpoint = "POST /logout";
        let resp = self
            .http
            .post(self.config.endpoint("logout"))
            .query(&[("scope", "global")])
            .bearer_auth(access_token.as_str())
            .send()
            .await
            .map_err(|e| AuthApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        check(endpoint, resp).await.map(|_| ())
    }

    /// Send a password-recovery mail.
    ///
    /// Calls `POST {base_url}/auth/v1/recover?redirect_to={redirect_to}`.
    pub async fn recover(&self, email: &EmailAddress, redirect_to: &str) -> Result<(), AuthApiError> {
        let endpoint = "POST /recover";
        let body = RecoverRequest {
            email: email.as_str(),
        };
        self.post(endpoint, "recover", &[("redirect_to", redirect_to)], &body)
            .await
            .map(|_| ())
    }

    /// Update the phone number and/or password of the user behind
    /// `access_token`.
    ///
    /// Calls `PUT {base_url}/auth/v1/user`.
    pub async fn put_user(
        &self,
        access_token: &AccessToken,
        phone: Option<&PhoneNumber>,
        password: Option<&str>,
    ) -> Result<Identity, AuthApiError> {
        let endpoint = "PUT /user";
        let body = UpdateUserRequest {
            phone: phone.map(PhoneNumber::as_str),
            password,
        };
        let resp = self
            .http
            .put(self.config.endpoint("user"))
            .bearer_auth(access_token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        decode(endpoint, check(endpoint, resp).await?).await
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<reqwest::Response, AuthApiError> {
        let resp = self
            .http
            .post(self.config.endpoint(path))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        check(endpoint, resp).await
    }
}

/// Turn a non-2xx response into [`AuthApiError::ApiError`].
async fn check(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, AuthApiError> {
    if resp.status().is_success() {
        tracing::debug!(endpoint, status = resp.status().as_u16(), "auth provider call succeeded");
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(endpoint, status, "auth provider returned an error status");
    Err(AuthApiError::ApiError {
        endpoint: endpoint.into(),
        status,
        body,
    })
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: reqwest::Response) -> Result<T, AuthApiError> {
    resp.json().await.map_err(|e| AuthApiError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })
}
