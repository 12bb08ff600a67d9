//! Route access gate.
//!
//! Flow Overview: for every in-scope request, classify the path as public or
//! protected, ask the [`AuthStatus`] collaborator whether the caller is signed in,
//! then apply the decision table:
//!
//! | public | authenticated | decision          |
//! |--------|---------------|-------------------|
//! | yes    | yes           | redirect to home  |
//! | yes    | no            | allow             |
//! | no     | yes           | allow             |
//! | no     | no            | redirect to login |
//!
//! The gate keeps no state between requests. It does not retry or time out the
//! status lookup; a failed lookup is answered with `500`.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

mod matcher;
mod redirect;
mod status;

pub use self::matcher::{PathScope, PatternError, RouteMatcher};
pub use self::redirect::{Redirector, TemporaryRedirect};
pub use self::status::{
    AuthStatus, AuthStatusError, BackendAuthStatus, DEFAULT_SESSION_COOKIE, extract_session_token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

/// Apply the decision table.
#[must_use]
pub const fn decide(is_public: bool, authenticated: bool) -> Decision {
    match (is_public, authenticated) {
        (true, true) => Decision::RedirectToHome,
        (false, false) => Decision::RedirectToLogin,
        (true, false) | (false, true) => Decision::Allow,
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub public_paths: Vec<String>,
    pub login_path: String,
    pub home_path: String,
    pub always_gated_prefixes: Vec<String>,
    pub internal_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            public_paths: vec!["/auth".to_string()],
            login_path: "/auth".to_string(),
            home_path: "/".to_string(),
            always_gated_prefixes: vec!["/api".to_string(), "/trpc".to_string()],
            internal_prefixes: vec!["_internal".to_string()],
        }
    }
}

pub struct AccessGate {
    public: RouteMatcher,
    scope: PathScope,
    login_path: String,
    home_path: String,
    auth: Arc<dyn AuthStatus>,
    redirector: Arc<dyn Redirector>,
}

impl AccessGate {
    /// # Errors
    /// Returns an error if a public path pattern is invalid.
    pub fn new(config: GateConfig, auth: Arc<dyn AuthStatus>) -> Result<Self, PatternError> {
        Ok(Self {
            public: RouteMatcher::new(config.public_paths)?,
            scope: PathScope::new(config.always_gated_prefixes, config.internal_prefixes),
            login_path: config.login_path,
            home_path: config.home_path,
            auth,
            redirector: Arc::new(TemporaryRedirect),
        })
    }

    #[must_use]
    pub fn with_redirector(mut self, redirector: Arc<dyn Redirector>) -> Self {
        self.redirector = redirector;
        self
    }

    /// Whether the gate runs for `path` at all.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        self.scope.applies_to(path)
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public.matches(path)
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Produce the decision for one request.
    ///
    /// # Errors
    /// Returns the collaborator's error if the status lookup fails.
    pub async fn evaluate(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Decision, AuthStatusError> {
        let is_public = self.is_public(path);
        let authenticated = self.auth.is_authenticated(headers).await?;
        Ok(decide(is_public, authenticated))
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("public", &self.public.patterns())
            .field("scope", &self.scope)
            .field("login_path", &self.login_path)
            .field("home_path", &self.home_path)
            .finish_non_exhaustive()
    }
}

/// axum middleware running the gate, use with
/// `axum::middleware::from_fn_with_state(Arc<AccessGate>, enforce)`.
pub async fn enforce(State(gate): State<Arc<AccessGate>>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !gate.applies_to(path) {
        return next.run(request).await;
    }

    // Only the parts are held across the status lookup; the body is not `Sync`.
    let (parts, body) = request.into_parts();
    let decision = gate.evaluate(parts.uri.path(), &parts.headers).await;
    let request = Request::from_parts(parts, body);

    match decision {
        Ok(Decision::Allow) => next.run(request).await,
        Ok(Decision::RedirectToLogin) => {
            debug!("redirecting {} to {}", request.uri().path(), gate.login_path);
            gate.redirector.redirect(&request, &gate.login_path)
        }
        Ok(Decision::RedirectToHome) => {
            debug!("redirecting {} to {}", request.uri().path(), gate.home_path);
            gate.redirector.redirect(&request, &gate.home_path)
        }
        Err(err) => {
            error!("Failed to resolve authentication status: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::header::LOCATION,
        middleware::from_fn_with_state,
        routing::get,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedStatus {
        authenticated: bool,
        calls: AtomicUsize,
    }

    impl FixedStatus {
        fn new(authenticated: bool) -> Arc<Self> {
            Arc::new(Self {
                authenticated,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthStatus for FixedStatus {
        async fn is_authenticated(&self, _headers: &HeaderMap) -> Result<bool, AuthStatusError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.authenticated)
        }
    }

    struct FailingStatus;

    #[async_trait]
    impl AuthStatus for FailingStatus {
        async fn is_authenticated(&self, _headers: &HeaderMap) -> Result<bool, AuthStatusError> {
            Err(AuthStatusError::Backend(StatusCode::BAD_GATEWAY))
        }
    }

    fn app(auth: Arc<dyn AuthStatus>) -> Result<Router> {
        let gate = Arc::new(AccessGate::new(GateConfig::default(), auth)?);
        Ok(Router::new()
            .route("/", get(|| async { "home" }))
            .route("/auth", get(|| async { "login" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/logo.svg", get(|| async { "svg" }))
            .layer(from_fn_with_state(gate, enforce)))
    }

    async fn get_path(app: Router, path: &str) -> Result<Response> {
        Ok(app
            .oneshot(Request::builder().uri(path).body(Body::empty())?)
            .await?)
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[test]
    fn decision_table() {
        assert_eq!(decide(true, true), Decision::RedirectToHome);
        assert_eq!(decide(true, false), Decision::Allow);
        assert_eq!(decide(false, true), Decision::Allow);
        assert_eq!(decide(false, false), Decision::RedirectToLogin);
    }

    #[tokio::test]
    async fn evaluate_reads_path_and_headers() -> Result<()> {
        fn assert_send<T: Send>(value: T) -> T {
            value
        }

        let gate = AccessGate::new(GateConfig::default(), FixedStatus::new(false))?;
        let headers = HeaderMap::new();
        // The lookup future crosses threads inside the tower stack.
        let decision = assert_send(gate.evaluate("/dashboard", &headers)).await?;
        assert_eq!(decision, Decision::RedirectToLogin);
        assert_eq!(gate.evaluate("/auth", &headers).await?, Decision::Allow);
        Ok(())
    }

    #[tokio::test]
    async fn public_path_unauthenticated_is_allowed() -> Result<()> {
        let response = get_path(app(FixedStatus::new(false))?, "/auth").await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn public_path_authenticated_redirects_home() -> Result<()> {
        let response = get_path(app(FixedStatus::new(true))?, "/auth").await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/"));
        Ok(())
    }

    #[tokio::test]
    async fn protected_path_unauthenticated_redirects_to_login() -> Result<()> {
        let response = get_path(app(FixedStatus::new(false))?, "/dashboard").await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/auth"));
        Ok(())
    }

    #[tokio::test]
    async fn protected_path_authenticated_is_allowed() -> Result<()> {
        for path in ["/", "/dashboard"] {
            let response = get_path(app(FixedStatus::new(true))?, path).await?;
            assert_eq!(response.status(), StatusCode::OK, "path {path}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_protected_path_still_redirects() -> Result<()> {
        let response = get_path(app(FixedStatus::new(false))?, "/missing").await?;
        assert_eq!(location(&response), Some("/auth"));
        Ok(())
    }

    #[tokio::test]
    async fn static_assets_skip_the_status_lookup() -> Result<()> {
        let status = FixedStatus::new(false);
        let response = get_path(app(status.clone())?, "/logo.svg").await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(status.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn status_is_queried_once_per_request() -> Result<()> {
        let status = FixedStatus::new(true);
        let router = app(status.clone())?;
        get_path(router.clone(), "/dashboard").await?;
        get_path(router, "/auth").await?;
        assert_eq!(status.calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failed_status_lookup_is_an_internal_error() -> Result<()> {
        let response = get_path(app(Arc::new(FailingStatus))?, "/dashboard").await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn custom_redirector_is_used() -> Result<()> {
        struct SeeOther;
        impl Redirector for SeeOther {
            fn redirect(&self, _request: &Request, target: &str) -> Response {
                axum::response::Redirect::to(target).into_response()
            }
        }

        let gate = AccessGate::new(GateConfig::default(), FixedStatus::new(false))?
            .with_redirector(Arc::new(SeeOther));
        let router = Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .layer(from_fn_with_state(Arc::new(gate), enforce));
        let response = get_path(router, "/dashboard").await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/auth"));
        Ok(())
    }
}
