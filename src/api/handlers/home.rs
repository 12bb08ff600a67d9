use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Home {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home page", body = Home),
        (status = 307, description = "Not signed in, redirected to login")
    ),
    tag = "pages"
)]
// Only reachable through the gate, so the caller is signed in.
pub async fn home() -> impl IntoResponse {
    Json(Home {
        message: "You are signed in".to_string(),
    })
}
