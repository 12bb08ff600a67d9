#![allow(clippy::needless_for_each)]

use crate::gate::{self, AccessGate};
use anyhow::Result;
use axum::{
    Extension, Json, Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::ServeDir,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, debug_span, info};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;

use self::handlers::auth::{self, AuthState};
#[allow(unused_imports)]
use self::handlers::{
    auth::{
        __path_oauth, __path_page, __path_sign_in, __path_sign_out, __path_sign_up, oauth, page,
        sign_in, sign_out, sign_up,
        types::{AuthCard, ErrorResponse, FlowSwitch, ProviderLink, SignInRequest, SignUpRequest},
    },
    health,
    health::{__path_health, Health},
    home,
    home::{__path_home, Home},
};

#[derive(OpenApi)]
#[openapi(
    paths(health, home, page, sign_in, sign_up, sign_out, oauth),
    components(
        schemas(
            Health, Home, AuthCard, FlowSwitch, ProviderLink, SignInRequest, SignUpRequest,
            ErrorResponse
        )
    ),
    tags(
        (name = "auth", description = "Sign-in, sign-up and sessions"),
        (name = "pages", description = "Pages behind the access gate"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}

/// Build the application router.
///
/// Every route except `/health` runs behind the access gate; the gate decides
/// on its own which paths (static assets, internal routes) it ignores.
pub fn router(gate: Arc<AccessGate>, auth_state: Arc<AuthState>, assets_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        // allow requests from any origin
        .allow_origin(Any);

    let mut app = Router::new()
        .route("/", get(handlers::home))
        .route(auth::PAGE_PATH, get(handlers::auth::page))
        .route(auth::SIGN_IN_PATH, post(handlers::auth::sign_in))
        .route(auth::SIGN_UP_PATH, post(handlers::auth::sign_up))
        .route(auth::SIGN_OUT_PATH, post(handlers::auth::sign_out))
        .route(
            &format!("{}/{{provider}}", auth::OAUTH_PATH),
            get(handlers::auth::oauth),
        )
        .route("/openapi.json", get(openapi_json));

    if let Some(dir) = assets_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(from_fn_with_state(gate, gate::enforce))
            .layer(Extension(auth_state)),
    )
    .route("/health", get(handlers::health).options(handlers::health))
}

/// Serve `app` until Ctrl-C.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn new(port: u16, app: Router) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

// span; headers are left out because they carry the session cookie
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", %method, path, request_id)
}
