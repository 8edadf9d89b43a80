//! Result store trait.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::entity::EntityRecord;

/// Append-only, key-deduplicated persistence of entity records.
///
/// Implementations keep records in insertion order and never hold two
/// records with the same key.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load every stored record in order.
    ///
    /// Fails soft: a missing or unreadable store is reported as empty.
    async fn load_all(&self) -> Vec<EntityRecord>;

    /// Persist the candidates whose key is not stored yet.
    ///
    /// Returns how many records were written. Calling this twice with the
    /// same candidates writes nothing the second time.
    async fn append_new(&self, candidates: &[EntityRecord]) -> StoreResult<usize>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

/// Candidates whose key is neither in `existing` nor repeated earlier in the batch.
pub fn distinct_new(existing: &[EntityRecord], candidates: &[EntityRecord]) -> Vec<EntityRecord> {
    let mut seen: HashSet<&str> = existing.iter().map(|r| r.key()).collect();
    candidates
        .iter()
        .filter(|r| seen.insert(r.key()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_new_filters_existing_and_repeats() {
        let existing = vec![EntityRecord::new("A")];
        let candidates = vec![
            EntityRecord::new("A"),
            EntityRecord::new("B"),
            EntityRecord::new("B"),
            EntityRecord::new("C"),
        ];

        let names: Vec<String> = distinct_new(&existing, &candidates)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
