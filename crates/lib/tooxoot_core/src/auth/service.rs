//! Authentication service: registration, login and token verification.

use std::sync::Arc;

use tracing::{debug, info};

use super::AuthError;
use super::claims::Claims;
use super::jwt::TokenSigner;
use crate::clock::Clock;
use crate::models::auth::{CredentialRecord, verify_credentials};
use crate::store::credentials::CredentialStore;
use crate::store::{Datastore, StoreError};

/// Ties credential storage to claims issuance and token signing.
pub struct Authenticator<D> {
    store: CredentialStore<D>,
    signer: Arc<TokenSigner>,
    clock: Arc<dyn Clock>,
    hash_cost: u32,
}

impl<D: Datastore> Authenticator<D> {
    pub fn new(
        store: CredentialStore<D>,
        signer: Arc<TokenSigner>,
        clock: Arc<dyn Clock>,
        hash_cost: u32,
    ) -> Self {
        Self {
            store,
            signer,
            clock,
            hash_cost,
        }
    }

    pub fn store(&self) -> &CredentialStore<D> {
        &self.store
    }

    /// Create and persist credentials for a new identity.
    pub fn register(&self, id: &str, password: &str) -> Result<CredentialRecord, AuthError> {
        if id.is_empty() {
            return Err(AuthError::EmptyId);
        }

        match self.store.fetch_complete_by_id(id) {
            Err(StoreError::NoResults { .. }) => {}
            Ok(_) | Err(StoreError::TooManyResults { .. }) => {
                return Err(AuthError::AlreadyRegistered(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        // The datastore settles concurrent registrations of one id.
        let mut record = CredentialRecord::create(id, password, self.hash_cost)?;
        match self.store.persist(Some(&mut record)) {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => {
                return Err(AuthError::AlreadyRegistered(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %id, "registered credentials");
        Ok(record)
    }

    /// Check `password` for `id` and issue a signed token.
    ///
    /// The token is also stored on the credential record.
    pub fn login(&self, id: &str, password: &str) -> Result<String, AuthError> {
        let mut record = match self.store.fetch_complete_by_id(id) {
            Ok(record) => Some(record),
            Err(StoreError::NoResults { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        if !verify_credentials(record.as_ref(), password) {
            debug!(id = %id, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::new(id, self.clock.as_ref()).ok_or(AuthError::EmptyId)?;
        let token = self.signer.sign(&claims)?;

        if let Some(record) = record.as_mut() {
            record.token = token.clone();
        }
        self.store.persist(record.as_mut())?;

        info!(id = %id, expires_at = %claims.exp, "issued token");
        Ok(token)
    }

    /// Last token stored for `id`, if any.
    pub fn current_token(&self, id: &str) -> Result<Option<String>, AuthError> {
        let record = self.store.fetch_token_projection_by_id(id)?;
        Ok(Some(record.token).filter(|t| !t.is_empty()))
    }

    /// Verify a token's signature, then validate its claims.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.signer.parse(token)?;
        claims.validate(self.clock.as_ref())?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::auth::claims::ClaimsError;
    use crate::auth::jwt::TokenError;
    use crate::auth::password::MIN_COST;
    use crate::clock::FixedClock;
    use crate::store::memory::MemoryDatastore;

    const PKCS1_KEY: &str = include_str!("../../testdata/rsa_pkcs1.pem");

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn signer() -> Arc<TokenSigner> {
        Arc::new(TokenSigner::from_pem(PKCS1_KEY).unwrap())
    }

    fn authenticator_at(now: DateTime<Utc>) -> Authenticator<MemoryDatastore> {
        Authenticator::new(
            CredentialStore::new(MemoryDatastore::new()),
            signer(),
            Arc::new(FixedClock(now)),
            MIN_COST,
        )
    }

    #[test]
    fn register_persists_hashed_credentials() {
        let auth = authenticator_at(test_time());
        let record = auth.register("alice", "secret").unwrap();

        assert!(record.store_key().is_some());
        assert!(record.verify("secret"));
        assert_eq!(auth.store().datastore().len(), 1);
    }

    #[test]
    fn register_rejects_empty_and_duplicate_ids() {
        let auth = authenticator_at(test_time());
        assert!(matches!(auth.register("", "secret"), Err(AuthError::EmptyId)));

        auth.register("alice", "secret").unwrap();
        assert!(matches!(
            auth.register("alice", "other"),
            Err(AuthError::AlreadyRegistered(id)) if id == "alice"
        ));
        assert_eq!(auth.store().datastore().len(), 1);
    }

    #[test]
    fn concurrent_registrations_of_one_id_admit_one() {
        for _ in 0..10 {
            let auth = authenticator_at(test_time());

            let results: Vec<_> = std::thread::scope(|s| {
                let handles: Vec<_> = (0..8)
                    .map(|_| s.spawn(|| auth.register("alice", "secret")))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results.iter().filter(|r| r.is_err()).all(
                |r| matches!(r, Err(AuthError::AlreadyRegistered(id)) if id == "alice")
            ));
            assert_eq!(auth.store().datastore().len(), 1);
            assert!(auth.login("alice", "secret").is_ok());
        }
    }

    #[test]
    fn login_issues_a_valid_token() {
        let auth = authenticator_at(test_time());
        auth.register("alice", "secret").unwrap();

        let token = auth.login("alice", "secret").unwrap();
        let claims = auth.authenticate(&token).unwrap();

        assert_eq!(claims.id, "alice");
        assert_eq!(claims.iat, test_time());
        assert_eq!(claims.exp, test_time() + Duration::hours(24));
    }

    #[test]
    fn login_stores_the_token() {
        let auth = authenticator_at(test_time());
        auth.register("alice", "secret").unwrap();
        assert_eq!(auth.current_token("alice").unwrap(), None);

        let token = auth.login("alice", "secret").unwrap();

        assert_eq!(auth.current_token("alice").unwrap(), Some(token));
        assert_eq!(auth.store().datastore().len(), 1);
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let auth = authenticator_at(test_time());
        auth.register("alice", "secret").unwrap();

        assert!(matches!(
            auth.login("alice", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("bob", "secret"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("", "secret"),
            Err(AuthError::Store(StoreError::EmptyId))
        ));
    }

    #[test]
    fn authenticate_rejects_expired_tokens() {
        let issuer = authenticator_at(test_time());
        issuer.register("alice", "secret").unwrap();
        let token = issuer.login("alice", "secret").unwrap();

        let later = authenticator_at(test_time() + Duration::hours(25));
        assert!(matches!(
            later.authenticate(&token),
            Err(AuthError::Claims(ClaimsError::Expired))
        ));
    }

    #[test]
    fn authenticate_rejects_bad_signatures() {
        let auth = authenticator_at(test_time());
        assert!(matches!(
            auth.authenticate("not-a-token"),
            Err(AuthError::Token(TokenError::Malformed(_)))
        ));
    }
}
