//! Sign-in and sign-up forms.
//!
//! Validation never stops at the first failing rule: every rule of every field
//! is checked and the messages are collected per field, in rule order, so the
//! caller can render all of them next to the inputs at once.

use crate::credentials::{Credentials, Flow};
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 16;

/// Characters accepted as the mandatory password symbol.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for `field`, empty when the field is valid.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        self.0.get(&field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Clone, Default, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Default, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// Passwords stay out of Debug output so forms can be logged safely.
impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

impl SignInForm {
    /// Validate the form and turn it into sign-in credentials.
    ///
    /// # Errors
    /// Returns every failing rule, grouped by field.
    pub fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()?;

        Ok(Credentials::new(
            self.email,
            SecretString::from(self.password),
            Flow::SignIn,
        ))
    }
}

impl SignUpForm {
    /// Validate the form and turn it into sign-up credentials.
    ///
    /// A confirmation mismatch is reported on `confirm_password`, never on
    /// `password`.
    ///
    /// # Errors
    /// Returns every failing rule, grouped by field.
    pub fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        check_confirm_password(&self.password, &self.confirm_password, &mut errors);
        errors.into_result()?;

        Ok(Credentials::new(
            self.email,
            SecretString::from(self.password),
            Flow::SignUp,
        ))
    }
}

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$").ok()
});

/// Email format check.
///
/// The local part may use letters, digits and `_'+-.`, must not start with a
/// dot and must not end with `.` or `'`. Dots never repeat, and the top-level
/// domain has at least two letters.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    if email.starts_with('.') || email.contains("..") {
        return false;
    }
    EMAIL.as_ref().is_some_and(|regex| regex.is_match(email))
}

/// Length as seen by browser form validation (UTF-16 code units).
fn input_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if !valid_email(email) {
        errors.push(Field::Email, "Invalid email address");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    let len = input_len(password);
    if len < PASSWORD_MIN_LEN {
        errors.push(
            Field::Password,
            format!("Password must be at least {PASSWORD_MIN_LEN} characters"),
        );
    }
    if len > PASSWORD_MAX_LEN {
        errors.push(
            Field::Password,
            format!("Password must be at most {PASSWORD_MAX_LEN} characters"),
        );
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(
            Field::Password,
            "Password must contain at least one uppercase letter.",
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(Field::Password, "Password must contain at least one number.");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push(Field::Password, "Password must contain at least one symbol.");
    }
}

fn check_confirm_password(password: &str, confirm: &str, errors: &mut FieldErrors) {
    let len = input_len(confirm);
    if len < PASSWORD_MIN_LEN {
        errors.push(
            Field::ConfirmPassword,
            format!("Confirm password must be at least {PASSWORD_MIN_LEN} characters"),
        );
    }
    if len > PASSWORD_MAX_LEN {
        errors.push(
            Field::ConfirmPassword,
            format!("Confirm password must be at most {PASSWORD_MAX_LEN} characters"),
        );
    }
    if password != confirm {
        errors.push(
            Field::ConfirmPassword,
            "Password and Confirm Password don't match.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use secrecy::ExposeSecret;

    fn sign_in(email: &str, password: &str) -> SignInForm {
        SignInForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn sign_up(email: &str, password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email(""));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
        assert!(!valid_email("with space@example.com"));
    }

    #[test]
    fn valid_email_rejects_malformed_addresses() {
        for email in [
            "a@b.c",
            "x..y@example.com",
            ".x@example.com",
            "a!#$@example.com",
            "x.@example.com",
            "a@example..com",
            "a@-example.com",
        ] {
            assert!(!valid_email(email), "{email} accepted");
        }
    }

    #[test]
    fn valid_email_ignores_case_and_allows_plus_tags() {
        assert!(valid_email("Alice+news@Example.COM"));
        assert!(valid_email("o'neil.x@mail.example.org"));
    }

    #[test]
    fn password_length_counts_utf16_units() -> Result<()> {
        // Each emoji is two UTF-16 units: 4 of them plus "A1!" is 11 units.
        let password = "A1!\u{1F600}\u{1F600}\u{1F600}\u{1F600}";
        assert_eq!(password.chars().count(), 7);
        assert!(sign_in("a@example.com", password).validate().is_ok());

        // 8 emoji plus "A1!" is 19 units, past the maximum.
        let password = format!("A1!{}", "\u{1F600}".repeat(8));
        let Err(errors) = sign_in("a@example.com", &password).validate() else {
            bail!("long password accepted");
        };
        assert_eq!(
            errors.get(Field::Password),
            ["Password must be at most 16 characters"]
        );
        Ok(())
    }

    #[test]
    fn sign_up_long_confirmation_reports_length_and_mismatch() -> Result<()> {
        let Err(errors) =
            sign_up("a@example.com", "Abcdef1!", "Abcdefghijklmn1!x").validate()
        else {
            bail!("long confirmation accepted");
        };
        assert!(errors.get(Field::Password).is_empty());
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            [
                "Confirm password must be at most 16 characters",
                "Password and Confirm Password don't match.",
            ]
        );
        Ok(())
    }

    #[test]
    fn sign_in_accepts_strong_password() -> Result<()> {
        let credentials = match sign_in("alice@example.com", "Secr3t!pw").validate() {
            Ok(credentials) => credentials,
            Err(errors) => bail!("unexpected errors: {errors}"),
        };
        assert_eq!(credentials.email(), "alice@example.com");
        assert_eq!(credentials.password().expose_secret(), "Secr3t!pw");
        assert_eq!(credentials.flow(), Flow::SignIn);
        Ok(())
    }

    #[test]
    fn lowercase_only_password_fails_three_rules() -> Result<()> {
        let Err(errors) = sign_in("alice@example.com", "abcdefgh").validate() else {
            bail!("expected validation to fail");
        };
        assert_eq!(
            errors.get(Field::Password),
            [
                "Password must contain at least one uppercase letter.",
                "Password must contain at least one number.",
                "Password must contain at least one symbol.",
            ]
        );
        assert!(errors.get(Field::Email).is_empty());
        Ok(())
    }

    #[test]
    fn password_length_bounds() -> Result<()> {
        let Err(short) = sign_in("a@example.com", "Ab1!").validate() else {
            bail!("short password accepted");
        };
        assert_eq!(
            short.get(Field::Password),
            ["Password must be at least 8 characters"]
        );

        let Err(long) = sign_in("a@example.com", "Abcdefghijklmn1!x").validate() else {
            bail!("long password accepted");
        };
        assert_eq!(
            long.get(Field::Password),
            ["Password must be at most 16 characters"]
        );

        // Both bounds are inclusive.
        assert!(sign_in("a@example.com", "Abcdef1!").validate().is_ok());
        assert!(sign_in("a@example.com", "Abcdefghijklm1!x").validate().is_ok());
        Ok(())
    }

    #[test]
    fn every_listed_symbol_counts() {
        for symbol in PASSWORD_SYMBOLS.chars() {
            let password = format!("Abcdef1{symbol}");
            assert!(
                sign_in("a@example.com", &password).validate().is_ok(),
                "symbol {symbol:?} rejected"
            );
        }
    }

    #[test]
    fn unlisted_symbol_does_not_count() -> Result<()> {
        let Err(errors) = sign_in("a@example.com", "Abcdef1-").validate() else {
            bail!("expected validation to fail");
        };
        assert_eq!(
            errors.get(Field::Password),
            ["Password must contain at least one symbol."]
        );
        Ok(())
    }

    #[test]
    fn invalid_email_is_reported_alongside_password_errors() -> Result<()> {
        let Err(errors) = sign_in("nope", "short").validate() else {
            bail!("expected validation to fail");
        };
        assert_eq!(errors.get(Field::Email), ["Invalid email address"]);
        assert_eq!(errors.get(Field::Password).len(), 4);
        Ok(())
    }

    #[test]
    fn sign_up_mismatch_is_attached_to_confirm_password() -> Result<()> {
        let Err(errors) = sign_up("a@example.com", "Secr3t!pw", "Secr3t!pX").validate() else {
            bail!("expected validation to fail");
        };
        assert!(errors.get(Field::Password).is_empty());
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            ["Password and Confirm Password don't match."]
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), [Field::ConfirmPassword]);
        Ok(())
    }

    #[test]
    fn sign_up_short_confirmation_reports_length_and_mismatch() -> Result<()> {
        let Err(errors) = sign_up("a@example.com", "Secr3t!pw", "abc").validate() else {
            bail!("expected validation to fail");
        };
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            [
                "Confirm password must be at least 8 characters",
                "Password and Confirm Password don't match.",
            ]
        );
        Ok(())
    }

    #[test]
    fn sign_up_produces_sign_up_flow() -> Result<()> {
        let credentials = match sign_up("a@example.com", "Secr3t!pw", "Secr3t!pw").validate() {
            Ok(credentials) => credentials,
            Err(errors) => bail!("unexpected errors: {errors}"),
        };
        assert_eq!(credentials.flow(), Flow::SignUp);
        Ok(())
    }

    #[test]
    fn field_errors_serialize_by_field_name() -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.push(Field::ConfirmPassword, "mismatch");
        errors.push(Field::Email, "bad");
        let value = serde_json::to_value(&errors)?;
        assert_eq!(
            value,
            serde_json::json!({ "email": ["bad"], "confirm_password": ["mismatch"] })
        );
        Ok(())
    }

    #[test]
    fn debug_output_hides_passwords() {
        let rendered = format!("{:?}", sign_up("a@example.com", "Secr3t!pw", "Secr3t!pw"));
        assert!(!rendered.contains("Secr3t"));
        assert!(rendered.contains("a@example.com"));
    }
}
