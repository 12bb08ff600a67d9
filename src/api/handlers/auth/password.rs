//! Email/password sign-in and sign-up.
//!
//! Flow Overview: validate the form, then hand the credentials to the
//! credential exchange with the matching flow tag. Validation failures never
//! reach the backend.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    session::session_cookie,
    state::AuthState,
    types::{ErrorResponse, SignInRequest, SignUpRequest},
};
use crate::{
    credentials::Credentials,
    forms::{SignInForm, SignUpForm},
};

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 303, description = "Signed in, session cookie set, redirected home"),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Credentials rejected by the auth backend", body = ErrorResponse),
        (status = 422, description = "Validation failed, messages keyed by field"),
        (status = 502, description = "Auth backend failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignInRequest>>,
) -> Response {
    let request: SignInRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match SignInForm::from(request).validate() {
        Ok(credentials) => submit(&auth_state, &credentials).await,
        Err(errors) => {
            debug!("Sign-in validation failed: {errors}");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 303, description = "Signed up, session cookie set, redirected home"),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Sign-up rejected by the auth backend", body = ErrorResponse),
        (status = 422, description = "Validation failed, messages keyed by field"),
        (status = 502, description = "Auth backend failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignUpRequest>>,
) -> Response {
    let request: SignUpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match SignUpForm::from(request).validate() {
        Ok(credentials) => submit(&auth_state, &credentials).await,
        Err(errors) => {
            debug!("Sign-up validation failed: {errors}");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
    }
}

async fn submit(auth_state: &AuthState, credentials: &Credentials) -> Response {
    let session = match auth_state.exchange().exchange(credentials).await {
        Ok(session) => session,
        Err(err) => {
            error!(flow = %credentials.flow(), "{} {}", err.name(), err.message());
            let status = if err.is_rejection() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_GATEWAY
            };
            let body = ErrorResponse {
                name: err.name().to_string(),
                message: err.message(),
            };
            return (status, Json(body)).into_response();
        }
    };

    let cookie = match session_cookie(auth_state.config(), session.token.expose_secret()) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    (headers, Redirect::to(auth_state.config().home_path())).into_response()
}
