//! Document store gateway.
//!
//! [`Datastore`] is the capability set the credential store needs from a
//! backing document store: key allocation, keyed writes and filtered reads.
//! Records travel as [`Entity`] property maps produced with serde.
//!
//! - [`credentials::CredentialStore`]: credential persistence on top of a datastore
//! - [`memory::MemoryDatastore`]: in-process datastore
//! - [`query::Query`]: filter/projection query builder

pub mod credentials;
pub mod memory;
pub mod query;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use query::{Operator, Query};

/// Errors raised by the store gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("nil query")]
    NilQuery,

    #[error("empty id")]
    EmptyId,

    #[error("No Results for Query '{query}'")]
    NoResults { query: Query },

    #[error("Got {count} results for Query '{query}'")]
    TooManyResults { count: usize, query: Query },

    /// Another entity of `kind` already holds `id`.
    #[error("{kind} '{id}' already exists")]
    Conflict { kind: String, id: String },

    /// Failure reported by the backing store, passed through as-is.
    #[error("{0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Handle identifying a stored entity.
///
/// An incomplete key has a kind but no id yet; the store completes it on write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    kind: String,
    id: Option<u64>,
}

impl Key {
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }

    pub fn complete(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "/{},{id}", self.kind),
            None => write!(f, "/{},incomplete", self.kind),
        }
    }
}

/// A stored document: its key and its properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub key: Option<Key>,
    pub properties: Map<String, Value>,
}

impl Entity {
    /// Build a keyless entity from a record that serializes to a JSON object.
    pub fn from_record<T: Serialize + ?Sized>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(properties) => Ok(Self {
                key: None,
                properties,
            }),
            other => Err(StoreError::Serialization(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Decode the properties into a record. Missing properties follow the
    /// record's serde defaults.
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.properties.clone()))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.properties.get(field)
    }
}

/// Primitive operations of a backing document store.
pub trait Datastore: Send + Sync {
    /// Incomplete key of `kind`, to be completed by [`Datastore::put`].
    fn allocate_key(&self, kind: &str) -> Key;

    /// Write `entity` under `key`, returning the key it was stored under.
    fn put(&self, key: &Key, entity: Entity) -> Result<Key, StoreError>;

    /// All entities matching `query`, each carrying its complete key.
    fn query_all(&self, query: &Query) -> Result<Vec<Entity>, StoreError>;

    fn new_query(&self, kind: &str) -> Query {
        Query::new(kind)
    }
}

impl<D: Datastore + ?Sized> Datastore for Arc<D> {
    fn allocate_key(&self, kind: &str) -> Key {
        (**self).allocate_key(kind)
    }

    fn put(&self, key: &Key, entity: Entity) -> Result<Key, StoreError> {
        (**self).put(key, entity)
    }

    fn query_all(&self, query: &Query) -> Result<Vec<Entity>, StoreError> {
        (**self).query_all(query)
    }

    fn new_query(&self, kind: &str) -> Query {
        (**self).new_query(kind)
    }
}
