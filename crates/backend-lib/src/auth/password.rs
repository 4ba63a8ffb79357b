// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.

use thiserror::Error;
use zeroize::Zeroize;

/// bcrypt only reads this many input bytes; longer plaintexts are
/// rejected rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Lowest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

/// Production cost factor, keeps hashing around tens of milliseconds.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashing failure. Too-long input is its own kind so callers can
/// pre-validate instead of treating it as an opaque internal error.
#[derive(Error, Debug)]
pub enum HashError {
    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    PasswordTooLong,

    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Hash a password with the production cost factor.
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    hash_password_with_cost(plain, DEFAULT_COST)
}

/// Hash a password with an explicit cost factor.
///
/// Every call draws a fresh random salt, so hashing the same plaintext
/// twice yields two different strings that both verify it.
pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, HashError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(HashError::PasswordTooLong);
    }
    Ok(bcrypt::hash(plain, cost)?)
}

/// Verify a password against a stored hash.
///
/// Returns `false` for a mismatch and for a structurally malformed hash;
/// the two are not distinguishable by the caller.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

/// Hash a password and zeroize the plaintext afterwards.
pub fn hash_password_secure(plain: &mut String, cost: u32) -> Result<String, HashError> {
    let hash = hash_password_with_cost(plain, cost)?;
    plain.zeroize();
    Ok(hash)
}
