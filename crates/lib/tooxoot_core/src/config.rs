//! Authentication configuration.
//!
//! Key material and hashing cost come from the environment:
//!
//! - `RSAKEY`: PEM-encoded PKCS#1 RSA private key
//! - `TOOXOOT_HASH_COST`: bcrypt cost factor (default [`MIN_COST`])

use std::env;

use tracing::warn;

use crate::auth::jwt::TokenSigner;
use crate::auth::keys::KeyError;
use crate::auth::password::{MAX_COST, MIN_COST};

/// Environment variable holding the signing key.
pub const RSAKEY_ENV: &str = "RSAKEY";

/// Environment variable holding the bcrypt cost.
pub const HASH_COST_ENV: &str = "TOOXOOT_HASH_COST";

/// Resolved authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// PEM-encoded PKCS#1 RSA private key.
    pub rsa_key: String,
    /// bcrypt cost factor for new credentials.
    pub hash_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("rsa_key", &if self.rsa_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(rsa_key: impl Into<String>, hash_cost: u32) -> Self {
        Self {
            rsa_key: rsa_key.into(),
            hash_cost,
        }
    }

    /// Env vars only. A missing key is left empty and reported when the
    /// signer is built.
    pub fn from_env() -> Self {
        Self {
            rsa_key: env::var(RSAKEY_ENV).unwrap_or_default(),
            hash_cost: parse_hash_cost(env::var(HASH_COST_ENV).ok().as_deref()),
        }
    }

    /// Build the process signer from the configured key.
    pub fn signer(&self) -> Result<TokenSigner, KeyError> {
        TokenSigner::from_pem(&self.rsa_key)
    }
}

/// Parse a bcrypt cost, falling back to [`MIN_COST`] when absent, not a
/// number, or outside `MIN_COST..=MAX_COST`.
pub fn parse_hash_cost(value: Option<&str>) -> u32 {
    let parsed: Option<u32> = value.and_then(|v| v.trim().parse().ok());
    match parsed {
        Some(cost) if (MIN_COST..=MAX_COST).contains(&cost) => cost,
        Some(cost) => {
            warn!(cost, "bcrypt cost out of range, using {MIN_COST}");
            MIN_COST
        }
        None => MIN_COST,
    }
}
