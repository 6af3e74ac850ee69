//! # Session Store Contract
//!
//! The remote identity provider seen from the API: credential issuance,
//! session lookup, refresh-token exchange and revocation. The API never stores
//! sessions itself; every answer comes from here.
//!
//! Implementations must be cheap to share (`Send + Sync + 'static`) because
//! one instance serves every request concurrently. Calls are not retried by
//! callers, so a failure is final for the request that made it.
//!
//! # Example
//!
//! ```rust,ignore
//! impl SessionStore for MyProvider {
//!     async fn lookup_session(&self, access: &AccessToken)
//!         -> Result<Option<Identity>, StoreError>
//!     {
//!         self.http.get_user(access).await
//!     }
//!     // ...
//! }
//! ```

use std::future::Future;

use crate::error::StoreError;
use crate::identity::{Identity, Session};
use crate::otp::{EmailAddress, OtpChannel, OtpCode, OtpType, PhoneNumber};
use crate::token::{AccessToken, RefreshToken};

/// Attributes of the signed-in user that may be changed through the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserUpdate {
    /// Start a phone change; the provider sends a `phone_change` code to the
    /// new number.
    Phone(PhoneNumber),
    /// Replace the user's password.
    Password(String),
}

/// Consumer-provided identity provider.
pub trait SessionStore: Send + Sync + 'static {
    /// Resolve the session behind an access token.
    ///
    /// `Ok(None)` means the provider answered and there is no active session
    /// for the token (expired or revoked). `Err` means the lookup itself
    /// failed.
    fn lookup_session(
        &self,
        access_token: &AccessToken,
    ) -> impl Future<Output = Result<Option<Identity>, StoreError>> + Send;

    /// Exchange a refresh token for a fresh session.
    fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Revoke the session behind an access token.
    fn sign_out(
        &self,
        access_token: &AccessToken,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Email + password sign-in.
    fn sign_in_with_password(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Ask the provider to send a one-time code. Returns no session.
    fn sign_in_with_otp(
        &self,
        phone: &PhoneNumber,
        channel: OtpChannel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Verify a one-time code previously sent to `phone`.
    fn verify_otp(
        &self,
        phone: &PhoneNumber,
        token: &OtpCode,
        otp_type: OtpType,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Send a password-recovery mail that links back to `redirect_to`.
    fn reset_password_for_email(
        &self,
        email: &EmailAddress,
        redirect_to: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Change an attribute of the user behind `access_token`.
    fn update_user(
        &self,
        access_token: &AccessToken,
        update: UserUpdate,
    ) -> impl Future<Output = Result<Identity, StoreError>> + Send;
}
