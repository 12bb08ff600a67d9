use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_ASSETS_DIR, ARG_PORT, backend, gate},
};
use crate::gate::GateConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

fn strings(matches: &clap::ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| {
            values
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn string(matches: &clap::ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let auth_url = string(matches, backend::ARG_AUTH_URL)?;
    let auth_url = Url::parse(&auth_url).context("invalid GATEHOUSE_AUTH_URL")?;

    let gate = GateConfig {
        public_paths: strings(matches, gate::ARG_PUBLIC_PATH),
        login_path: string(matches, gate::ARG_LOGIN_PATH)?,
        home_path: string(matches, gate::ARG_HOME_PATH)?,
        always_gated_prefixes: strings(matches, gate::ARG_GATED_PREFIX),
        internal_prefixes: strings(matches, gate::ARG_INTERNAL_PREFIX),
    };

    Ok(Action::Server(Args {
        port,
        auth_url,
        gate,
        session_cookie: string(matches, backend::ARG_SESSION_COOKIE)?,
        session_ttl_seconds: matches
            .get_one::<u64>(backend::ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(crate::api::handlers::auth::state::DEFAULT_SESSION_TTL_SECONDS),
        cookie_secure: matches.get_flag(backend::ARG_COOKIE_SECURE),
        request_timeout_seconds: matches
            .get_one::<u64>(backend::ARG_REQUEST_TIMEOUT)
            .copied()
            .unwrap_or(10),
        assets_dir: matches.get_one::<String>(ARG_ASSETS_DIR).map(PathBuf::from),
    }))
}
