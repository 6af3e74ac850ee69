//! Wire types for the auth provider REST API.

use oneway_core::{AccessToken, CredentialPair, Identity, RefreshToken, Session};
use serde::{Deserialize, Serialize};

/// Session payload returned by the token and verify endpoints.
///
/// Fields use `#[serde(default)]` where the provider may omit them; unknown
/// fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: Identity,
}

impl From<TokenResponse> for Session {
    fn from(resp: TokenResponse) -> Self {
        Session {
            identity: resp.user,
            credentials: CredentialPair {
                access_token: AccessToken::new(resp.access_token),
                refresh_token: RefreshToken::new(resp.refresh_token),
            },
        }
    }
}

/// Error body in any of the shapes the provider uses.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProviderErrorBody {
    /// Best human-readable message in a raw error body, falling back to the
    /// body text itself.
    pub fn message_from(body: &str) -> String {
        let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
        parsed
            .msg
            .or(parsed.message)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_else(|| body.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpRequest<'a> {
    pub phone: &'a str,
    pub channel: &'a str,
    pub create_user: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    pub phone: &'a str,
    pub token: &'a str,
    #[serde(rename = "type")]
    pub otp_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecoverRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_msg_then_description() {
        assert_eq!(
            ProviderErrorBody::message_from(r#"{"msg":"Token has expired or is invalid"}"#),
            "Token has expired or is invalid"
        );
        assert_eq!(
            ProviderErrorBody::message_from(
                r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#
            ),
            "Invalid Refresh Token: Already Used"
        );
        assert_eq!(
            ProviderErrorBody::message_from(r#"{"error":"invalid_grant"}"#),
            "invalid_grant"
        );
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        assert_eq!(ProviderErrorBody::message_from(" upstream down \n"), "upstream down");
    }

    #[test]
    fn token_response_converts_to_session() {
        let resp: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "created_at": "2024-12-07T09:30:36Z",
                "last_sign_in_at": "2024-12-07T09:30:41Z"
            }
        }))
        .unwrap();
        let session = Session::from(resp);
        assert_eq!(session.credentials.access_token.as_str(), "at-1");
        assert_eq!(session.credentials.refresh_token.as_str(), "rt-1");
    }

    #[test]
    fn verify_request_renames_type_field() {
        let body = serde_json::to_value(VerifyRequest {
            phone: "+233123456789",
            token: "123456",
            otp_type: "phone_change",
        })
        .unwrap();
        assert_eq!(body["type"], "phone_change");
    }
}
