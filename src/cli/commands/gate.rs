use clap::{Arg, Command};

pub const ARG_PUBLIC_PATH: &str = "public-path";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_HOME_PATH: &str = "home-path";
pub const ARG_GATED_PREFIX: &str = "gated-prefix";
pub const ARG_INTERNAL_PREFIX: &str = "internal-prefix";

pub const DEFAULT_PUBLIC_PATHS: &str = "/auth,/auth/signin,/auth/signup,/auth/oauth/:provider";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_PATH)
                .long(ARG_PUBLIC_PATH)
                .help("Route patterns reachable without a session, comma separated")
                .long_help(
                    "Route patterns reachable without a session, comma separated. `(.*)` matches any remainder, `:name` matches one segment.",
                )
                .env("GATEHOUSE_PUBLIC_PATHS")
                .value_delimiter(',')
                .default_value(DEFAULT_PUBLIC_PATHS),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Where signed-out users are sent")
                .env("GATEHOUSE_LOGIN_PATH")
                .default_value("/auth"),
        )
        .arg(
            Arg::new(ARG_HOME_PATH)
                .long(ARG_HOME_PATH)
                .help("Where signed-in users visiting a public page are sent")
                .env("GATEHOUSE_HOME_PATH")
                .default_value("/"),
        )
        .arg(
            Arg::new(ARG_GATED_PREFIX)
                .long(ARG_GATED_PREFIX)
                .help("Path prefixes always gated, even when they look like files, comma separated")
                .env("GATEHOUSE_GATED_PREFIXES")
                .value_delimiter(',')
                .default_value("/api,/trpc"),
        )
        .arg(
            Arg::new(ARG_INTERNAL_PREFIX)
                .long(ARG_INTERNAL_PREFIX)
                .help("Internal path prefixes the gate ignores, comma separated")
                .env("GATEHOUSE_INTERNAL_PREFIXES")
                .value_delimiter(',')
                .default_value("_internal"),
        )
}
