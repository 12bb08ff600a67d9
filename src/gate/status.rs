//! Authentication status lookups.

use async_trait::async_trait;
use axum::http::{
    HeaderMap, StatusCode,
    header::{AUTHORIZATION, COOKIE},
};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_SESSION_COOKIE: &str = "gatehouse_session";

#[derive(Debug, Error)]
pub enum AuthStatusError {
    #[error("auth backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("auth backend returned {0}")]
    Backend(StatusCode),
}

/// Answers "is this request authenticated?".
///
/// Implementations must not cache: the gate asks once per request.
#[async_trait]
pub trait AuthStatus: Send + Sync {
    async fn is_authenticated(&self, headers: &HeaderMap) -> Result<bool, AuthStatusError>;
}

/// [`AuthStatus`] that validates the session token with the auth backend.
#[derive(Debug, Clone)]
pub struct BackendAuthStatus {
    client: Client,
    session_url: Url,
    cookie_name: String,
}

impl BackendAuthStatus {
    /// # Errors
    /// Returns an error if the session endpoint cannot be derived from `auth_url`.
    pub fn new(
        client: Client,
        auth_url: &Url,
        cookie_name: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            session_url: crate::backend::endpoint(auth_url, "session")?,
            cookie_name: cookie_name.into(),
        })
    }
}

#[async_trait]
impl AuthStatus for BackendAuthStatus {
    #[instrument(skip_all)]
    async fn is_authenticated(&self, headers: &HeaderMap) -> Result<bool, AuthStatusError> {
        // No token means no session; the backend is not asked.
        let Some(token) = extract_session_token(headers, &self.cookie_name) else {
            return Ok(false);
        };

        let response = self
            .client
            .get(self.session_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(AuthStatusError::Transport)?;

        let status = response.status();
        debug!("Session lookup status: {status}");

        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NO_CONTENT | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            other => Err(AuthStatusError::Backend(other)),
        }
    }
}

/// Read the session token from the named cookie, falling back to a bearer token.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty());
    if let Some(token) = from_cookie {
        return Some(token.to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
