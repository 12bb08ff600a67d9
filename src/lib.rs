//! # Gatehouse
//!
//! `gatehouse` is the authentication front door of a web application. It owns
//! three things:
//!
//! 1. **The access gate**: a middleware that runs in front of every page and API
//!    route, classifies the path as public or protected, asks the auth backend
//!    whether the caller is signed in, and either lets the request through or
//!    redirects it to the login page or the home page.
//! 2. **The auth forms**: sign-in and sign-up field sets with per-field
//!    validation (email format, password strength, confirmation match).
//! 3. **Credential exchange**: validated forms are forwarded to the external auth
//!    backend together with a flow tag (`signIn` / `signUp`); the session token
//!    it returns is handed to the browser as an `HttpOnly` cookie.
//!
//! The auth backend itself is external. Both of its roles (answering "is this
//! request authenticated?" and exchanging credentials for a session) sit behind
//! traits, so the gate and the handlers can be driven by fakes in tests.

pub mod api;
pub mod backend;
pub mod cli;
pub mod credentials;
pub mod forms;
pub mod gate;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
