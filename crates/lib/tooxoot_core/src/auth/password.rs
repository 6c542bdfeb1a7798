//! Password hashing via bcrypt.

use thiserror::Error;

/// Lowest bcrypt cost factor, and the default for tooxoot.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Password hashing failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt hash: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a password with bcrypt at `cost`.
///
/// Passwords longer than bcrypt's 72-byte input limit are rejected rather
/// than silently truncated.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::non_truncating_hash(password, cost)?)
}

/// Verify a password against a bcrypt hash.
///
/// Malformed hashes and over-long passwords never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::non_truncating_verify(password, hash).unwrap_or(false)
}
