//! Credential record persistence.

use tracing::debug;

use super::{Datastore, Entity, Operator, Query, StoreError};
use crate::models::auth::CredentialRecord;

/// Entity kind under which credential records are stored.
pub const USER_KIND: &str = "USER";

/// Stores and looks up [`CredentialRecord`]s in a [`Datastore`].
///
/// Holds no state besides the datastore handle; every call is independent.
#[derive(Debug, Clone)]
pub struct CredentialStore<D> {
    datastore: D,
}

impl<D: Datastore> CredentialStore<D> {
    pub fn new(datastore: D) -> Self {
        Self { datastore }
    }

    pub fn datastore(&self) -> &D {
        &self.datastore
    }

    /// Insert or update `record`.
    ///
    /// A record without a store key gets a freshly allocated `USER` key,
    /// otherwise its key is reused. On success the record adopts the key
    /// returned by the store; on failure it is left untouched. `None` is a
    /// successful no-op.
    ///
    /// Persisting a record fetched through a projection overwrites the
    /// stored properties it lacks.
    pub fn persist(&self, record: Option<&mut CredentialRecord>) -> Result<(), StoreError> {
        let Some(record) = record else {
            return Ok(());
        };

        let entity = Entity::from_record(&*record)?;
        let key = match &record.store_key {
            Some(key) => key.clone(),
            None => self.datastore.allocate_key(USER_KIND),
        };

        let stored = self.datastore.put(&key, entity)?;

        debug!(id = %record.id, key = %stored, "persisted credential record");
        record.store_key = Some(stored);

        Ok(())
    }

    /// Run `query` and require exactly one matching record.
    pub fn fetch_one(&self, query: Option<&Query>) -> Result<CredentialRecord, StoreError> {
        let query = query.ok_or(StoreError::NilQuery)?;

        let mut entities = self.datastore.query_all(query)?;

        match entities.len() {
            0 => Err(StoreError::NoResults {
                query: query.clone(),
            }),
            1 => {
                let entity = entities.remove(0);
                let mut record: CredentialRecord = entity.to_record()?;
                record.store_key = entity.key;
                Ok(record)
            }
            count => Err(StoreError::TooManyResults {
                count,
                query: query.clone(),
            }),
        }
    }

    /// Fetch only the `id` and `token` of the record with `id`.
    pub fn fetch_token_projection_by_id(&self, id: &str) -> Result<CredentialRecord, StoreError> {
        if id.is_empty() {
            return Err(StoreError::EmptyId);
        }

        let query = self
            .datastore
            .new_query(USER_KIND)
            .filter("id", Operator::Equal, id)
            .project(["id", "token"]);

        self.fetch_one(Some(&query))
    }

    /// Fetch the full record with `id`.
    pub fn fetch_complete_by_id(&self, id: &str) -> Result<CredentialRecord, StoreError> {
        if id.is_empty() {
            return Err(StoreError::EmptyId);
        }

        let query = self
            .datastore
            .new_query(USER_KIND)
            .filter("id", Operator::Equal, id);

        self.fetch_one(Some(&query))
    }
}
