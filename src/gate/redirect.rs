use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Redirect, Response},
};

/// Produces the redirect response the gate sends back.
pub trait Redirector: Send + Sync {
    fn redirect(&self, request: &Request<Body>, target: &str) -> Response;
}

/// `307 Temporary Redirect` to the target path. The request's query string is
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporaryRedirect;

impl Redirector for TemporaryRedirect {
    fn redirect(&self, _request: &Request<Body>, target: &str) -> Response {
        Redirect::temporary(target).into_response()
    }
}
