use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use super::state::AuthState;
use crate::{backend, credentials::OAuthProvider};

#[utoipa::path(
    get,
    path = "/auth/oauth/{provider}",
    params(
        ("provider" = String, Path, description = "`google` or `github`")
    ),
    responses(
        (status = 307, description = "Redirect to the auth backend's provider login"),
        (status = 404, description = "Unknown provider")
    ),
    tag = "auth"
)]
pub async fn oauth(
    Path(provider): Path<String>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let Ok(provider) = provider.parse::<OAuthProvider>() else {
        debug!("Unknown OAuth provider: {provider}");
        return StatusCode::NOT_FOUND.into_response();
    };

    match backend::endpoint(auth_state.config().auth_url(), &format!("signin/{provider}")) {
        Ok(url) => Redirect::temporary(url.as_str()).into_response(),
        Err(err) => {
            error!("Failed to build provider URL: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
