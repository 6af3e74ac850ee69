//! [`SessionStore`] implementation backed by the provider's REST API.

use oneway_core::{
    AccessToken, EmailAddress, Identity, OtpChannel, OtpCode, OtpType, PhoneNumber, RefreshToken,
    Session, SessionStore, StoreError, UserUpdate,
};

use crate::AuthProviderClient;

impl SessionStore for AuthProviderClient {
    async fn lookup_session(&self, access_token: &AccessToken) -> Result<Option<Identity>, StoreError> {
        self.get_user(access_token)
            .await
            .map_err(|e| e.into_store_error("lookup_session"))
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> Result<Session, StoreError> {
        self.refresh_grant(refresh_token)
            .await
            .map_err(|e| e.into_store_error("refresh_session"))
    }

    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), StoreError> {
        self.logout(access_token)
            .await
            .map_err(|e| e.into_store_error("sign_out"))
    }

    async fn sign_in_with_password(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Session, StoreError> {
        self.password_grant(email, password)
            .await
            .map_err(|e| e.into_store_error("sign_in_with_password"))
    }

    async fn sign_in_with_otp(&self, phone: &PhoneNumber, channel: OtpChannel) -> Result<(), StoreError> {
        self.send_otp(phone, channel)
            .await
            .map_err(|e| e.into_store_error("sign_in_with_otp"))
    }

    async fn verify_otp(
        &self,
        phone: &PhoneNumber,
        token: &OtpCode,
        otp_type: OtpType,
    ) -> Result<Session, StoreError> {
        self.verify(phone, token, otp_type)
            .await
            .map_err(|e| e.into_store_error("verify_otp"))
    }

    async fn reset_password_for_email(
        &self,
        email: &EmailAddress,
        redirect_to: &str,
    ) -> Result<(), StoreError> {
        self.recover(email, redirect_to)
            .await
            .map_err(|e| e.into_store_error("reset_password_for_email"))
    }

    async fn update_user(&self, access_token: &AccessToken, update: UserUpdate) -> Result<Identity, StoreError> {
        let result = match &update {
            UserUpdate::Phone(phone) => {
                self.put_user(access_token, Some(phone), None).await
            }
            UserUpdate::Password(password) => {
                self.put_user(access_token, None, Some(password)).await
            }
        };
        result.map_err(|e| e.into_store_error("update_user"))
    }
}
