//! Request/response types for auth endpoints.

use crate::forms::{SignInForm, SignUpForm};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Missing fields deserialize as empty strings so validation reports them per field.
#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<SignInRequest> for SignInForm {
    fn from(request: SignInRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
        }
    }
}

impl From<SignUpRequest> for SignUpForm {
    fn from(request: SignUpRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            confirm_password: request.confirm_password,
        }
    }
}

/// Error name and message as reported by the auth backend.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub name: String,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProviderLink {
    pub id: String,
    pub label: String,
    pub href: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FlowSwitch {
    pub prompt: String,
    pub label: String,
    pub href: String,
}

/// Everything a client needs to render the sign-in or sign-up card.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthCard {
    pub flow: String,
    pub title: String,
    pub description: String,
    pub action: String,
    pub fields: Vec<String>,
    pub providers: Vec<ProviderLink>,
    pub switch: FlowSwitch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn sign_up_request_uses_snake_case_confirmation() -> Result<()> {
        let request: SignUpRequest = serde_json::from_value(serde_json::json!({
            "email": "alice@example.com",
            "password": "Secr3t!pw",
            "confirm_password": "Secr3t!pw"
        }))?;
        let form = SignUpForm::from(request);
        assert_eq!(form.confirm_password, "Secr3t!pw");
        Ok(())
    }

    #[test]
    fn missing_fields_default_to_empty() -> Result<()> {
        let request: SignUpRequest =
            serde_json::from_value(serde_json::json!({ "email": "alice@example.com" }))?;
        assert_eq!(request.email, "alice@example.com");
        assert!(request.password.is_empty());
        assert!(request.confirm_password.is_empty());
        Ok(())
    }
}
