//! Authentication domain models.

use serde::{Deserialize, Serialize};

use crate::auth::password::{self, PasswordError};
use crate::store::Key;

/// A stored user identity.
///
/// The store key is owned by the credential store: it is filled in on the
/// first successful persist and on fetch, and never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialRecord {
    /// Logical identity; the lookup key for single-record queries.
    pub id: String,
    /// bcrypt hash of the password.
    pub hash: String,
    /// Opaque token persisted alongside the identity.
    pub token: String,
    #[serde(skip)]
    pub(crate) store_key: Option<Key>,
}

impl CredentialRecord {
    /// Create a record for `id` with the password hashed at `cost`.
    ///
    /// Fails only when hashing fails; `id` is not checked here.
    pub fn create(id: &str, password: &str, cost: u32) -> Result<Self, PasswordError> {
        let hash = password::hash_password(password, cost)?;

        Ok(Self {
            id: id.to_string(),
            hash,
            token: String::new(),
            store_key: None,
        })
    }

    /// Check `password` against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        password::verify_password(password, &self.hash)
    }

    /// Key assigned by the store, if the record has been persisted or fetched.
    pub fn store_key(&self) -> Option<&Key> {
        self.store_key.as_ref()
    }
}

/// Check `password` against a possibly absent record. An absent record never matches.
pub fn verify_credentials(record: Option<&CredentialRecord>, password: &str) -> bool {
    record.is_some_and(|r| r.verify(password))
}
