use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::{
    OAUTH_PATH, SIGN_IN_PATH, SIGN_UP_PATH,
    state::AuthState,
    types::{AuthCard, FlowSwitch, ProviderLink},
};
use crate::{
    credentials::{Flow, OAuthProvider},
    forms::Field,
};

const DESCRIPTION: &str = "Use your email or another service to continue";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// `signIn` (default) or `signUp`
    #[param(value_type = Option<String>)]
    pub flow: Option<Flow>,
}

#[utoipa::path(
    get,
    path = "/auth",
    params(PageQuery),
    responses(
        (status = 200, description = "Sign-in or sign-up card", body = AuthCard),
        (status = 307, description = "Already signed in, redirected home")
    ),
    tag = "auth"
)]
pub async fn page(
    Query(query): Query<PageQuery>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    Json(card(
        query.flow.unwrap_or(Flow::SignIn),
        auth_state.config().login_path(),
    ))
}

/// Build the card; the flow switch links back to `login_path`.
pub(super) fn card(flow: Flow, login_path: &str) -> AuthCard {
    let (title, action, fields, switch) = match flow {
        Flow::SignIn => (
            "Login to continue",
            SIGN_IN_PATH,
            vec![Field::Email, Field::Password],
            FlowSwitch {
                prompt: "Don't have an account?".to_string(),
                label: "Sign Up".to_string(),
                href: format!("{login_path}?flow={}", Flow::SignUp),
            },
        ),
        Flow::SignUp => (
            "Signup to continue",
            SIGN_UP_PATH,
            vec![Field::Email, Field::Password, Field::ConfirmPassword],
            FlowSwitch {
                prompt: "Already have an account?".to_string(),
                label: "Sign In".to_string(),
                href: format!("{login_path}?flow={}", Flow::SignIn),
            },
        ),
    };

    AuthCard {
        flow: flow.to_string(),
        title: title.to_string(),
        description: DESCRIPTION.to_string(),
        action: action.to_string(),
        fields: fields.into_iter().map(|field| field.to_string()).collect(),
        providers: OAuthProvider::ALL
            .into_iter()
            .map(|provider| ProviderLink {
                id: provider.to_string(),
                label: format!("Continue with {provider}"),
                href: format!("{OAUTH_PATH}/{provider}"),
            })
            .collect(),
        switch,
    }
}
