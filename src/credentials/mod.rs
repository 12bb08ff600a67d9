//! Credential exchange with the external auth backend.
//!
//! Flow Overview: a validated form becomes [`Credentials`], the exchange posts
//! `{email, password, flow}` to the backend's `password` provider and returns
//! the session token the backend issued. Failures carry the backend's error
//! name and message through unchanged; nothing here retries.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

/// Provider id of the email/password login on the auth backend.
pub const PASSWORD_PROVIDER: &str = "password";

/// Tells the backend whether the credentials belong to an existing account or
/// a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Flow {
    SignIn,
    SignUp,
}

impl Flow {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "signIn",
            Self::SignUp => "signUp",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signIn" => Ok(Self::SignIn),
            "signUp" => Ok(Self::SignUp),
            other => Err(format!("unknown flow: {other}")),
        }
    }
}

/// Third-party identity providers the backend can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub const ALL: [Self; 2] = [Self::Google, Self::Github];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    email: String,
    password: SecretString,
    flow: Flow,
}

impl Credentials {
    #[must_use]
    pub fn new(email: String, password: SecretString, flow: Flow) -> Self {
        Self {
            email,
            password,
            flow,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }
}

/// Session issued by the backend after a successful exchange.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("{name}: {message}")]
    Rejected { name: String, message: String },
    #[error("auth backend returned {0}")]
    Backend(StatusCode),
    #[error("auth backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid auth backend response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ExchangeError {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Rejected { name, .. } => name,
            Self::Backend(_) => "BackendError",
            Self::Transport(_) => "TransportError",
            Self::Decode(_) => "DecodeError",
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The backend looked at the credentials and said no.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Exchange credentials for a session.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn exchange(&self, credentials: &Credentials) -> Result<Session, ExchangeError>;
}

/// [`CredentialExchange`] backed by the auth backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCredentialExchange {
    client: Client,
    signin_url: Url,
}

#[derive(Deserialize)]
struct SessionBody {
    token: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    name: Option<String>,
    message: Option<String>,
}

impl HttpCredentialExchange {
    /// # Errors
    /// Returns an error if the sign-in endpoint cannot be derived from `auth_url`.
    pub fn new(client: Client, auth_url: &Url) -> Result<Self, url::ParseError> {
        let signin_url = crate::backend::endpoint(auth_url, &format!("signin/{PASSWORD_PROVIDER}"))?;
        Ok(Self { client, signin_url })
    }

    #[must_use]
    pub fn signin_url(&self) -> &Url {
        &self.signin_url
    }
}

#[async_trait]
impl CredentialExchange for HttpCredentialExchange {
    #[instrument(skip_all, fields(flow = %credentials.flow()))]
    async fn exchange(&self, credentials: &Credentials) -> Result<Session, ExchangeError> {
        let form = [
            ("email", credentials.email()),
            ("password", credentials.password().expose_secret()),
            ("flow", credentials.flow().as_str()),
        ];

        let response = self
            .client
            .post(self.signin_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|err| {
                error!("Credential exchange request failed: {err}");
                ExchangeError::Transport(err)
            })?;

        let status = response.status();
        debug!("Credential exchange status: {status}");

        if status == StatusCode::OK {
            let body: SessionBody = response.json().await.map_err(ExchangeError::Decode)?;
            return Ok(Session {
                token: SecretString::from(body.token),
            });
        }

        if is_rejection_status(status) {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let name = body.name.unwrap_or_else(|| "InvalidCredentials".to_string());
            let message = body.message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Rejected")
                    .to_string()
            });
            error!("{} {}", name, message);
            return Err(ExchangeError::Rejected { name, message });
        }

        error!("Credential exchange failed: {status}");
        Err(ExchangeError::Backend(status))
    }
}

fn is_rejection_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::CONFLICT
            | StatusCode::UNPROCESSABLE_ENTITY
    )
}
