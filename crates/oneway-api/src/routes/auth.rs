//! # Auth API
//!
//! Credential issuance and account routes. Every session question is
//! answered by the [`SessionStore`]; these handlers only validate input,
//! delegate, and manage the refresh-token cookie.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | POST | `/auth/admin/sign-in` | open |
//! | POST | `/auth/admin/forgot-password` | open |
//! | POST | `/auth/admin/reset-password` | gated |
//! | POST | `/auth/generate-otp` | open |
//! | POST | `/auth/verify-otp` | open |
//! | POST | `/auth/update-phone` | gated |
//! | GET  | `/auth/current-user` | gated |
//! | POST | `/auth/sign-out` | open |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use oneway_core::{
    EmailAddress, Identity, OtpChannel, OtpCode, OtpType, PhoneNumber, Session, SessionStore,
    SignInMethod, UserUpdate, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{self, auth_middleware};
use crate::context::RequestContext;
use crate::cookies;
use crate::error::{AppError, FieldErrors};
use crate::extractors::{extract_validated_json, non_blank, text, Validate};
use crate::state::AppState;

// -- Request DTOs ------------------------------------------------------------
//
// Fields stay untyped until validation so a wrongly typed value is reported
// against its field.

/// `POST /auth/admin/sign-in` body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

/// `POST /auth/generate-otp` body.
#[derive(Debug, Deserialize)]
pub struct GenerateOtpRequest {
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub channel: Option<Value>,
}

/// `POST /auth/verify-otp` body.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default, rename = "type")]
    pub otp_type: Option<Value>,
}

/// `POST /auth/update-phone` body.
#[derive(Debug, Deserialize)]
pub struct UpdatePhoneRequest {
    #[serde(default)]
    pub phone: Option<Value>,
}

/// `POST /auth/admin/forgot-password` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub redirect_to: Option<Value>,
}

/// `POST /auth/admin/reset-password` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub new_password: Option<Value>,
}

// -- Validation --------------------------------------------------------------

fn required(field: &'static str, raw: Option<Value>) -> Result<String, ValidationError> {
    non_blank(text(raw)?).ok_or(ValidationError::Required(field))
}

fn phone(raw: Option<Value>) -> Result<PhoneNumber, ValidationError> {
    PhoneNumber::new(text(raw)?.as_deref().unwrap_or_default())
}

impl Validate for SignInRequest {
    type Valid = (EmailAddress, String);

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(
            "email",
            required("Email", self.email).and_then(|e| EmailAddress::new(&e)),
        );
        let password = errors.check("password", required("Password", self.password));
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(errors),
        }
    }
}

impl Validate for GenerateOtpRequest {
    type Valid = (PhoneNumber, OtpChannel);

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        let mut errors = FieldErrors::new();
        let phone = errors.check("phone", phone(self.phone));
        let channel = errors.check(
            "channel",
            required("Channel", self.channel).and_then(|c| c.parse::<OtpChannel>()),
        );
        match (phone, channel) {
            (Some(phone), Some(channel)) => Ok((phone, channel)),
            _ => Err(errors),
        }
    }
}

impl Validate for VerifyOtpRequest {
    type Valid = (PhoneNumber, OtpCode, OtpType);

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        let mut errors = FieldErrors::new();
        let phone = errors.check("phone", phone(self.phone));
        let token = errors.check(
            "token",
            text(self.token).and_then(|t| OtpCode::new(t.as_deref().unwrap_or_default())),
        );
        let otp_type = errors.check(
            "type",
            text(self.otp_type).and_then(|t| match non_blank(t) {
                Some(t) => t.parse::<OtpType>(),
                None => Ok(OtpType::default()),
            }),
        );
        match (phone, token, otp_type) {
            (Some(phone), Some(token), Some(otp_type)) => Ok((phone, token, otp_type)),
            _ => Err(errors),
        }
    }
}

impl Validate for UpdatePhoneRequest {
    type Valid = PhoneNumber;

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        phone(self.phone).map_err(|e| FieldErrors::single("phone", e))
    }
}

impl Validate for ForgotPasswordRequest {
    type Valid = (EmailAddress, String);

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(
            "email",
            required("Email", self.email).and_then(|e| EmailAddress::new(&e)),
        );
        let redirect_to = errors.check("redirectTo", required("redirectTo url", self.redirect_to));
        match (email, redirect_to) {
            (Some(email), Some(redirect_to)) => Ok((email, redirect_to)),
            _ => Err(errors),
        }
    }
}

impl Validate for ResetPasswordRequest {
    type Valid = String;

    fn validate(self) -> Result<Self::Valid, FieldErrors> {
        required("Password", self.new_password).map_err(|e| FieldErrors::single("newPassword", e))
    }
}

// -- Responses ---------------------------------------------------------------

/// `{ "data": ... }` envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Credentials handed to a client that just signed in.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInData {
    pub access_token: String,
    pub refresh_token: String,
    pub is_new_user: bool,
}

impl SignInData {
    fn from_session(session: &Session, method: SignInMethod) -> Self {
        Self {
            access_token: session.credentials.access_token.as_str().to_string(),
            refresh_token: session.credentials.refresh_token.as_str().to_string(),
            is_new_user: session.is_new_user(method),
        }
    }
}

// -- Router ------------------------------------------------------------------

/// Build the auth router. Gated routes run behind [`auth_middleware`].
pub fn router<S: SessionStore>(state: AppState<S>) -> Router<AppState<S>> {
    let gated = Router::new()
        .route("/auth/update-phone", post(update_phone::<S>))
        .route("/auth/current-user", get(current_user))
        .route("/auth/admin/reset-password", post(reset_password::<S>))
        .route_layer(from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route("/auth/admin/sign-in", post(admin_sign_in::<S>))
        .route("/auth/admin/forgot-password", post(forgot_password::<S>))
        .route("/auth/generate-otp", post(generate_otp::<S>))
        .route("/auth/verify-otp", post(verify_otp::<S>))
        .route("/auth/sign-out", post(sign_out::<S>))
        .merge(gated)
}

// -- Handlers ----------------------------------------------------------------

/// Issue a session and the initial refresh cookie.
fn issue_session(
    jar: CookieJar,
    session: &Session,
    method: SignInMethod,
    secure: bool,
) -> impl IntoResponse {
    let jar = jar.add(cookies::refresh_cookie(&session.credentials.refresh_token, secure));
    (
        jar,
        Json(DataResponse {
            data: SignInData::from_session(session, method),
        }),
    )
}

/// POST /auth/admin/sign-in: Email + password sign-in.
async fn admin_sign_in<S: SessionStore>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (email, password) = extract_validated_json(body)?;
    let session = state.store.sign_in_with_password(&email, &password).await?;
    tracing::info!(user_id = %session.identity.id, "password sign-in");
    Ok(issue_session(
        jar,
        &session,
        SignInMethod::Password,
        state.config.secure_cookies,
    ))
}

/// POST /auth/generate-otp: Send a one-time code.
async fn generate_otp<S: SessionStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<GenerateOtpRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let (phone, channel) = extract_validated_json(body)?;
    state.store.sign_in_with_otp(&phone, channel).await?;
    tracing::info!(channel = channel.as_str(), "one-time code requested");
    Ok(StatusCode::OK)
}

/// POST /auth/verify-otp: Exchange a one-time code for a session.
async fn verify_otp<S: SessionStore>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (phone, token, otp_type) = extract_validated_json(body)?;
    let session = state.store.verify_otp(&phone, &token, otp_type).await?;
    tracing::info!(user_id = %session.identity.id, otp_type = otp_type.as_str(), "one-time code verified");
    Ok(issue_session(
        jar,
        &session,
        SignInMethod::Otp,
        state.config.secure_cookies,
    ))
}

/// POST /auth/sign-out: Revoke the session and clear the refresh cookie.
async fn sign_out<S: SessionStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = auth::bearer_token(&headers);
    auth::sign_out(state.store.as_ref(), token.as_ref()).await?;
    let jar = jar.add(cookies::clear_refresh_cookie(state.config.secure_cookies));
    Ok((jar, StatusCode::OK))
}

/// POST /auth/admin/forgot-password: Send a password-recovery mail.
async fn forgot_password<S: SessionStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let (email, redirect_to) = extract_validated_json(body)?;
    state
        .store
        .reset_password_for_email(&email, &redirect_to)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /auth/admin/reset-password: Set a new password for the caller.
async fn reset_password<S: SessionStore>(
    State(state): State<AppState<S>>,
    ctx: RequestContext,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let new_password = extract_validated_json(body)?;
    let (user, token) = ctx.require_user()?;
    state
        .store
        .update_user(token, UserUpdate::Password(new_password))
        .await?;
    tracing::info!(user_id = %user.id, "password changed");
    Ok(StatusCode::OK)
}

/// POST /auth/update-phone: Start a phone-number change for the caller.
///
/// The provider texts a `phone_change` code to the new number; the change
/// completes through `/auth/verify-otp`.
async fn update_phone<S: SessionStore>(
    State(state): State<AppState<S>>,
    ctx: RequestContext,
    body: Result<Json<UpdatePhoneRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let phone = extract_validated_json(body)?;
    let (user, token) = ctx.require_user()?;
    state
        .store
        .update_user(token, UserUpdate::Phone(phone))
        .await?;
    tracing::info!(user_id = %user.id, "phone change requested");
    Ok(StatusCode::OK)
}

/// GET /auth/current-user: The caller's identity.
async fn current_user(ctx: RequestContext) -> Result<Json<DataResponse<Identity>>, AppError> {
    let (user, _) = ctx.require_user()?;
    Ok(Json(DataResponse { data: user.clone() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: FieldErrors, field: &str) -> Vec<String> {
        err.field_errors.get(field).cloned().unwrap_or_default()
    }

    #[test]
    fn verify_rejects_five_digit_token() {
        let err = VerifyOtpRequest {
            phone: Some(json!("+233241234567")),
            token: Some(json!("12345")),
            otp_type: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err, "token"), vec!["Token must be a 6 digit number"]);
    }

    #[test]
    fn verify_reports_numeric_fields_against_the_field() {
        let err = VerifyOtpRequest {
            phone: Some(json!(233241234567u64)),
            token: Some(json!(12345)),
            otp_type: None,
        }
        .validate()
        .unwrap_err();
        assert!(err.form_errors.is_empty());
        assert_eq!(field_errors(err.clone(), "token"), vec!["Expected string, received number"]);
        assert_eq!(field_errors(err, "phone"), vec!["Expected string, received number"]);
    }

    #[test]
    fn sign_in_reports_wrongly_typed_password() {
        let err = SignInRequest {
            email: Some(json!("ama@example.com")),
            password: Some(json!(true)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err, "password"), vec!["Expected string, received boolean"]);
    }

    #[test]
    fn verify_defaults_type_to_sms() {
        let (_, _, otp_type) = VerifyOtpRequest {
            phone: Some(json!("+233241234567")),
            token: Some(json!("123456")),
            otp_type: None,
        }
        .validate()
        .unwrap();
        assert_eq!(otp_type, OtpType::Sms);
    }

    #[test]
    fn verify_accepts_phone_change() {
        let (_, _, otp_type) = VerifyOtpRequest {
            phone: Some(json!("+233241234567")),
            token: Some(json!("123456")),
            otp_type: Some(json!("phone_change")),
        }
        .validate()
        .unwrap();
        assert_eq!(otp_type, OtpType::PhoneChange);
    }

    #[test]
    fn verify_reports_every_bad_field() {
        let err = VerifyOtpRequest {
            phone: None,
            token: Some(json!("abcdef")),
            otp_type: Some(json!("email")),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field_errors.len(), 3);
    }

    #[test]
    fn generate_otp_rejects_unknown_channel() {
        let err = GenerateOtpRequest {
            phone: Some(json!("+233241234567")),
            channel: Some(json!("pigeon")),
        }
        .validate()
        .unwrap_err();
        assert!(field_errors(err, "channel")[0].contains("'pigeon'"));
    }

    #[test]
    fn generate_otp_requires_channel() {
        let err = GenerateOtpRequest {
            phone: Some(json!("+233241234567")),
            channel: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err, "channel"), vec!["Channel is required"]);
    }

    #[test]
    fn sign_in_requires_both_fields() {
        let err = SignInRequest {
            email: None,
            password: Some(json!("  ")),
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err.clone(), "email"), vec!["Email is required"]);
        assert_eq!(field_errors(err, "password"), vec!["Password is required"]);
    }

    #[test]
    fn sign_in_rejects_bad_email() {
        let err = SignInRequest {
            email: Some(json!("not-an-email")),
            password: Some(json!("pw")),
        }
        .validate()
        .unwrap_err();
        assert_eq!(field_errors(err, "email"), vec!["Invalid email"]);
    }

    #[test]
    fn forgot_password_requires_redirect() {
        let err = ForgotPasswordRequest {
            email: Some(json!("ops@oneway.test")),
            redirect_to: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            field_errors(err, "redirectTo"),
            vec!["redirectTo url is required"]
        );
    }

    #[test]
    fn reset_password_requires_value() {
        let err = ResetPasswordRequest { new_password: None }
            .validate()
            .unwrap_err();
        assert_eq!(field_errors(err, "newPassword"), vec!["Password is required"]);
    }
}
