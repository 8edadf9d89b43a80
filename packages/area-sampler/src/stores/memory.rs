//! In-memory storage implementation for testing and dry runs.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::{distinct_new, EntityStore};
use crate::types::entity::EntityRecord;

/// In-memory entity store.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<EntityRecord>>,
    append_calls: RwLock<usize>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with records (duplicates by key are dropped).
    pub fn with_records(records: Vec<EntityRecord>) -> Self {
        let store = Self::new();
        *store.records.write().unwrap() = distinct_new(&[], &records);
        store
    }

    /// Get the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.records
            .read()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// How many times `append_new` was called, including no-op calls.
    pub fn append_call_count(&self) -> usize {
        *self.append_calls.read().unwrap()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_all(&self) -> Vec<EntityRecord> {
        self.records.read().unwrap().clone()
    }

    async fn append_new(&self, candidates: &[EntityRecord]) -> StoreResult<usize> {
        *self.append_calls.write().unwrap() += 1;

        let mut records = self.records.write().unwrap();
        let fresh = distinct_new(&records, candidates);
        let count = fresh.len();
        records.extend(fresh);
        Ok(count)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
