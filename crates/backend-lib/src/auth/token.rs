// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed session token issuance and verification (HS256).

use authgate_common::User;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims embedded in every session token.
///
/// The token is self-contained: validity is entirely determined by the
/// signature and the embedded expiry, nothing is persisted server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user id as a decimal string
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

#[derive(Error, Debug)]
pub enum TokenError {
    /// Verification failure. Expired, malformed and badly-signed tokens
    /// all collapse into this one kind; callers cannot tell them apart.
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// A freshly minted token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mint a signed token for `user`, expiring `ttl` from now.
pub fn issue(user: &User, secret: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
    let expires_at = Utc::now() + ttl;
    let claims = TokenClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(IssuedToken { token, expires_at })
}

/// Decode and verify a token: signature, structure and expiry.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| TokenError::Invalid)
}
