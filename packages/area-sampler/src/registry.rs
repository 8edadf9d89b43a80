//! Run-scoped registry of entities already counted.

use std::collections::HashMap;

use crate::types::entity::EntityRecord;

/// Maps entity key to the first record seen under that key.
///
/// One registry covers one root search. It is passed by `&mut` through the
/// whole traversal and has no interior locking, so sibling regions must not
/// share it concurrently.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    entries: HashMap<String, EntityRecord>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has been counted in this run.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert `record` under `key` unless the key is already present.
    ///
    /// Returns `true` if the record was inserted. An existing entry is never
    /// replaced.
    pub fn add(&mut self, key: impl Into<String>, record: EntityRecord) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, record);
        true
    }

    /// Keep only records whose key is new, registering each as it passes.
    ///
    /// Duplicates inside `records` are dropped too; the first occurrence wins.
    pub fn admit(&mut self, records: impl IntoIterator<Item = EntityRecord>) -> Vec<EntityRecord> {
        let mut fresh = Vec::new();
        for record in records {
            if self.has(record.key()) {
                continue;
            }
            self.add(record.key().to_string(), record.clone());
            fresh.push(record);
        }
        fresh
    }

    pub fn get(&self, key: &str) -> Option<&EntityRecord> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_first_write_wins() {
        let mut registry = DedupRegistry::new();

        assert!(registry.add("Acme", EntityRecord::new("Acme").with_phone("1")));
        assert!(!registry.add("Acme", EntityRecord::new("Acme").with_phone("2")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Acme").unwrap().phone.as_deref(), Some("1"));
    }

    #[test]
    fn test_admit_drops_known_and_repeated_keys() {
        let mut registry = DedupRegistry::new();
        registry.add("Known", EntityRecord::new("Known"));

        let fresh = registry.admit(vec![
            EntityRecord::new("Known"),
            EntityRecord::new("New"),
            EntityRecord::new("New").with_rating("5/5"),
            EntityRecord::new("Other"),
        ]);

        let names: Vec<&str> = fresh.iter().map(|r| r.key()).collect();
        assert_eq!(names, vec!["New", "Other"]);
        assert!(fresh[0].rating.is_none());
        assert!(registry.has("Other"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_admit_twice_yields_nothing() {
        let mut registry = DedupRegistry::new();
        let batch = vec![EntityRecord::new("A"), EntityRecord::new("B")];

        assert_eq!(registry.admit(batch.clone()).len(), 2);
        assert!(registry.admit(batch).is_empty());
    }
}
