//! RSA private key loading from PEM-encoded PKCS#1 material.

use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use thiserror::Error;

/// Key loading failures. Each step fails with its own variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Empty RSAKEY")]
    Empty,

    #[error("Unable to decode RSAKEY")]
    Undecodable,

    #[error("Unable to parse RSAKEY: {0}")]
    Unparsable(String),
}

/// Parse a PEM-encoded PKCS#1 RSA private key.
pub fn read_rsa_key(key: &str) -> Result<RsaPrivateKey, KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    let block = pem::parse(key).map_err(|_| KeyError::Undecodable)?;

    RsaPrivateKey::from_pkcs1_der(block.contents())
        .map_err(|e| KeyError::Unparsable(e.to_string()))
}
