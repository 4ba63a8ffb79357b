// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
mod service;
mod service_impl;
pub mod token;

pub use password::{
    hash_password, hash_password_secure, verify_password, HashError, MAX_PASSWORD_BYTES,
};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{IssuedToken, TokenClaims, TokenError};
