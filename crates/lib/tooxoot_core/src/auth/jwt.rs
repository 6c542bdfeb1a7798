//! RS256 token signing and parsing.
//!
//! [`TokenSigner`] is built once from the process key and shared read-only
//! (usually behind an `Arc`) by every signing and parsing call.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use thiserror::Error;

use super::claims::Claims;
use super::keys::{KeyError, read_rsa_key};

/// Signature algorithm used for every token.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Token signing and parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Unable to sign claims: {0}")]
    Signing(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unexpected signing algorithm, expected RS256")]
    AlgorithmMismatch,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token error: {0}")]
    Other(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm => Self::AlgorithmMismatch,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed(err.to_string()),
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Signs claims with the private key and verifies tokens with its public half.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Build a signer from a parsed private key, deriving the public key once.
    pub fn new(key: &RsaPrivateKey) -> Result<Self, KeyError> {
        let private_der = key
            .to_pkcs1_der()
            .map_err(|e| KeyError::Unparsable(e.to_string()))?;
        let public_der = key
            .to_public_key()
            .to_pkcs1_der()
            .map_err(|e| KeyError::Unparsable(e.to_string()))?;

        // Signature and algorithm only; claim semantics are checked by
        // `Claims::validate`, and `exp`/`iat` are not numeric dates here.
        let mut validation = Validation::new(ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(private_der.as_bytes()),
            decoding_key: DecodingKey::from_rsa_der(public_der.as_bytes()),
            validation,
        })
    }

    /// Load a PEM-encoded PKCS#1 key and build a signer from it.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        Self::new(&read_rsa_key(pem)?)
    }

    /// Sign `claims` into a compact RS256 token.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the signature of `token` and decode its claims.
    ///
    /// The returned claims are not validated; call [`Claims::validate`].
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
