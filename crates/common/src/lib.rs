// ================
// crates/common/src/lib.rs
// ================
//! Common types shared between the `AuthGate` service library and binary:
//! the user record and the request/response schemas of the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record.
///
/// Deliberately carries no credential material: the password hash never
/// leaves the user directory, so this type cannot leak it through any
/// response or log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Numeric id, non-zero once persisted
    pub id: u64,
    /// Unique, 3-50 characters, immutable once set
    pub username: String,
    /// Unique, immutable once set
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,
    pub user: User,
    /// Absolute expiry of `token`
    pub expires_at: DateTime<Utc>,
}
