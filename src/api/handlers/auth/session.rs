//! Session cookie handling and sign-out.

use axum::{
    extract::Extension,
    http::{
        HeaderMap, HeaderValue,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tracing::error;

use super::state::{AuthConfig, AuthState};

/// Build a `HttpOnly` cookie carrying the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie(),
        config.session_ttl_seconds()
    );
    // Only mark cookies secure when the site is served over HTTPS.
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build an expired cookie that removes the session token from the browser.
pub(super) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie()
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 303, description = "Session cookie cleared, redirected to login")
    ),
    tag = "auth"
)]
pub async fn sign_out(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Always clear the cookie; the backend session expires on its own.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    (headers, Redirect::to(auth_state.config().login_path()))
}
