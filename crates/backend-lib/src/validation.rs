// ============================
// crates/backend-lib/src/validation.rs
// ============================
//! Structural validation for the auth request payloads.
//!
//! Runs before anything reaches the auth service; the service assumes
//! inputs that arrive there are well-formed.

use std::sync::LazyLock;

use authgate_common::{LoginRequest, RegisterRequest};
use regex::Regex;

use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::error::AppError;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 10;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Validate a registration payload.
pub fn validate_register(req: &RegisterRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)
}

/// Validate a login payload.
///
/// Only presence is required here; password shape rules apply at
/// registration time, not against already-stored credentials.
pub fn validate_login(req: &LoginRequest) -> Result<(), AppError> {
    if req.username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "username must be at least {MIN_USERNAME_LENGTH} characters"
        )));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(AppError::Validation(
            "username contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AppError::Validation("email is too long".to_string()));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::Validation("email format is invalid".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    // the hasher reads at most this many bytes; reject instead of truncating
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}
