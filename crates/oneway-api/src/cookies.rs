//! Refresh-token cookie.
//!
//! The refresh token never appears in a response body the browser can read;
//! it only travels in this HTTP-only cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oneway_core::RefreshToken;
use time::Duration;

/// Cookie name shared by every route that issues, rotates or clears it.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Seven days.
pub const REFRESH_COOKIE_MAX_AGE: Duration = Duration::days(7);

/// Cookie carrying a freshly issued or rotated refresh token.
pub fn refresh_cookie(token: &RefreshToken, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token.as_str().to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(REFRESH_COOKIE_MAX_AGE)
        .build()
}

/// Removal cookie: same name, path and attributes, expired.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Refresh token presented by the client, if any.
pub fn refresh_token(jar: &CookieJar) -> Option<RefreshToken> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .map(RefreshToken::new)
}
