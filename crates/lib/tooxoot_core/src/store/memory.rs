//! In-process datastore backed by a concurrent map.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tracing::debug;

use super::{Datastore, Entity, Key, Query, StoreError};

/// Property naming an entity's identity; unique within a kind.
pub const UNIQUE_PROPERTY: &str = "id";

/// Datastore holding entities in memory. Ids are allocated per store,
/// starting at 1.
///
/// A string [`UNIQUE_PROPERTY`] is claimed atomically on write, so two
/// entities of one kind never share it.
#[derive(Debug)]
pub struct MemoryDatastore {
    entities: DashMap<Key, Entity>,
    unique: DashMap<(String, String), Key>,
    next_id: AtomicU64,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
            unique: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Stored entity under `key`, if any.
    pub fn get(&self, key: &Key) -> Option<Entity> {
        self.entities.get(key).map(|e| e.value().clone())
    }

    /// Reserve `(kind, id)` for `key`. Re-claiming by the owner succeeds.
    fn claim(&self, key: &Key, id: &str) -> Result<(), StoreError> {
        match self.unique.entry((key.kind().to_string(), id.to_string())) {
            Entry::Occupied(slot) if slot.get() != key => Err(StoreError::Conflict {
                kind: key.kind().to_string(),
                id: id.to_string(),
            }),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(key.clone());
                Ok(())
            }
        }
    }
}

fn unique_value(entity: &Entity) -> Option<&str> {
    entity.get(UNIQUE_PROPERTY).and_then(Value::as_str)
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore for MemoryDatastore {
    fn allocate_key(&self, kind: &str) -> Key {
        Key::incomplete(kind)
    }

    fn put(&self, key: &Key, mut entity: Entity) -> Result<Key, StoreError> {
        if key.kind().is_empty() {
            return Err(StoreError::Backend("key has no kind".to_string()));
        }

        let key = if key.is_complete() {
            key.clone()
        } else {
            Key::complete(key.kind(), self.next_id.fetch_add(1, Ordering::SeqCst))
        };

        let claimed = unique_value(&entity).map(str::to_string);
        if let Some(id) = &claimed {
            self.claim(&key, id)?;
        }

        entity.key = Some(key.clone());
        if let Some(previous) = self.entities.insert(key.clone(), entity) {
            // Release the old identity when an overwrite renames the entity.
            let old = unique_value(&previous).filter(|old| Some(*old) != claimed.as_deref());
            if let Some(old) = old {
                self.unique.remove_if(&(key.kind().to_string(), old.to_string()), |_, owner| {
                    owner == &key
                });
            }
        }
        debug!(key = %key, "stored entity");

        Ok(key)
    }

    fn query_all(&self, query: &Query) -> Result<Vec<Entity>, StoreError> {
        let mut matched: Vec<Entity> = self
            .entities
            .iter()
            .filter(|e| e.key().kind() == query.kind() && query.matches(e.value()))
            .map(|e| query.apply_projection(e.value()))
            .collect();
        matched.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(query = %query, count = matched.len(), "ran query");
        Ok(matched)
    }
}
