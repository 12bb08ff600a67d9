use crate::{
    api::{self, handlers::auth::{AuthConfig, AuthState}},
    backend,
    cli::telemetry,
    credentials::HttpCredentialExchange,
    gate::{AccessGate, BackendAuthStatus, GateConfig},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_url: Url,
    pub gate: GateConfig,
    pub session_cookie: String,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub request_timeout_seconds: u64,
    pub assets_dir: Option<PathBuf>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the collaborators cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let client = backend::client(Duration::from_secs(args.request_timeout_seconds))
        .context("Failed to build auth backend client")?;

    let auth_status = BackendAuthStatus::new(client.clone(), &args.auth_url, &args.session_cookie)
        .context("Invalid auth backend session URL")?;
    let exchange = HttpCredentialExchange::new(client, &args.auth_url)
        .context("Invalid auth backend sign-in URL")?;

    let auth_config = AuthConfig::new(args.auth_url, args.session_cookie)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.cookie_secure)
        .with_paths(&args.gate.login_path, &args.gate.home_path);

    let gate = AccessGate::new(args.gate, Arc::new(auth_status)).context("Invalid public path")?;
    let auth_state = AuthState::new(auth_config, Arc::new(exchange));

    let app = api::router(Arc::new(gate), Arc::new(auth_state), args.assets_dir);

    let result = api::new(args.port, app).await;
    telemetry::shutdown_tracer();
    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("auth_url", args.auth_url.to_string()),
        ("public_paths", args.gate.public_paths.join(",")),
        ("login_path", args.gate.login_path.clone()),
        ("home_path", args.gate.home_path.clone()),
        ("gated_prefixes", args.gate.always_gated_prefixes.join(",")),
        ("internal_prefixes", args.gate.internal_prefixes.join(",")),
        ("session_cookie", args.session_cookie.clone()),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
        ("cookie_secure", args.cookie_secure.to_string()),
        (
            "request_timeout_seconds",
            args.request_timeout_seconds.to_string(),
        ),
        (
            "assets_dir",
            args.assets_dir
                .as_ref()
                .map_or_else(|| "none".to_string(), |dir| dir.display().to_string()),
        ),
    ];
    info!("{}", startup_message("Startup configuration", &entries));
}

fn startup_message(title: &str, entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const BANNER: &str = r"
   _______
  |   |   |
  |   |   |   G A T E H O U S E {VERSION}
  |___|___|";
