//! Keyed document store contract and the in-memory implementation

use crate::clock::Clock;
use crate::error::StoreError;
use dashmap::DashMap;
use serde_json::Value;
use sfk_record::{apply_update, FieldPath, UpdateValue};
use std::sync::Arc;

/// Collection holding the per-participant documents
pub const COLLECTION_USERS: &str = "users";

/// Keyed document get/set/update
///
/// `update` applies dotted partial-field paths; within one call the pairs
/// are applied in order, and across calls the store is last-write-wins at
/// field granularity. Concurrent writers touching disjoint fields compose;
/// writers touching the same field race.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Fetch a document, `None` if absent
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or replace a document wholesale
    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Apply partial field updates to an existing document
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        updates: &[(FieldPath, UpdateValue)],
    ) -> Result<(), StoreError>;
}

/// Deterministic in-memory store
///
/// Documents are JSON values in a per-collection map. Sentinel values are
/// resolved against the injected [`Clock`], which is what makes latency
/// and timestamp assertions exact in tests.
#[derive(Debug)]
pub struct MemoryStore {
    collections: DashMap<String, DashMap<String, Value>>,
    clock: Arc<dyn Clock>,
    /// When set, every call fails with `Unavailable` (write-failure tests)
    fail_with: parking_lot::Mutex<Option<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            collections: DashMap::new(),
            clock,
            fail_with: parking_lot::Mutex::new(None),
        }
    }

    /// Make every subsequent call fail with the given reason
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.fail_with.lock() = Some(reason.into());
    }

    /// Clear an injected failure
    pub fn heal(&self) {
        *self.fail_with.lock() = None;
    }

    /// Number of documents in a collection
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match self.fail_with.lock().as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(id).map(|doc| doc.clone())))
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.check_available()?;
        tracing::debug!(collection, id, "storing document");
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        updates: &[(FieldPath, UpdateValue)],
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let server_time_ms = self.clock.now_ms();

        let bucket = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let mut doc = bucket.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        for (path, value) in updates {
            apply_update(doc.value_mut(), path, value, server_time_ms)?;
        }
        tracing::debug!(collection, id, fields = updates.len(), "updated document");
        Ok(())
    }
}
