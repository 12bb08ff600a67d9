//! Shared HTTP plumbing for talking to the external auth backend.

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Build the reqwest client shared by every auth backend collaborator.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Join `path` onto the backend base URL.
///
/// Unlike [`Url::join`], a base without a trailing slash keeps its last path
/// segment, so `https://auth.tld/api` + `session` is `https://auth.tld/api/session`.
///
/// # Errors
/// Returns an error if the joined string is not a valid URL.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{base}/{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn endpoint_keeps_base_path() -> Result<()> {
        let base = Url::parse("https://auth.example.com/api")?;
        assert_eq!(
            endpoint(&base, "session")?.as_str(),
            "https://auth.example.com/api/session"
        );
        Ok(())
    }

    #[test]
    fn endpoint_collapses_slashes() -> Result<()> {
        let base = Url::parse("https://auth.example.com/")?;
        assert_eq!(
            endpoint(&base, "/signin/password")?.as_str(),
            "https://auth.example.com/signin/password"
        );
        Ok(())
    }
}
