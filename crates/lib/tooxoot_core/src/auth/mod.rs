//! Authentication logic.
//!
//! Claims issuance and validation, RS256 token signing, password hashing,
//! and the [`service::Authenticator`] that ties them to credential storage.

pub mod claims;
pub mod jwt;
pub mod keys;
pub mod password;
pub mod service;

use thiserror::Error;

use crate::store::StoreError;

use self::claims::ClaimsError;
use self::jwt::TokenError;
use self::keys::KeyError;
use self::password::PasswordError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("empty id")]
    EmptyId,

    #[error("User already registered: {0}")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
