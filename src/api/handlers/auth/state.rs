//! Shared state for the auth endpoints.

use crate::credentials::CredentialExchange;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    auth_url: Url,
    session_cookie: String,
    session_ttl_seconds: u64,
    session_cookie_secure: bool,
    login_path: String,
    home_path: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(auth_url: Url, session_cookie: impl Into<String>) -> Self {
        Self {
            auth_url,
            session_cookie: session_cookie.into(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            login_path: "/auth".to_string(),
            home_path: "/".to_string(),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, ttl: u64) -> Self {
        self.session_ttl_seconds = ttl;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_paths(mut self, login_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self.home_path = home_path.into();
        self
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }
}

pub struct AuthState {
    config: AuthConfig,
    exchange: Arc<dyn CredentialExchange>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, exchange: Arc<dyn CredentialExchange>) -> Self {
        Self { config, exchange }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn exchange(&self) -> &dyn CredentialExchange {
        self.exchange.as_ref()
    }
}
