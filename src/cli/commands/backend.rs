use clap::{Arg, ArgAction, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Auth backend base URL, example: https://auth.tld/api")
                .env("GATEHOUSE_AUTH_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long(ARG_REQUEST_TIMEOUT)
                .help("Timeout in seconds for auth backend requests")
                .env("GATEHOUSE_REQUEST_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Name of the session cookie")
                .env("GATEHOUSE_SESSION_COOKIE")
                .default_value(crate::gate::DEFAULT_SESSION_COOKIE),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("GATEHOUSE_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (site served over HTTPS)")
                .env("GATEHOUSE_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
