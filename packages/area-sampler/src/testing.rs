//! Testing utilities.
//!
//! Helpers for exercising the sampler without a real data source or disk.
//! See also [`crate::sources::MockDataSource`] and [`crate::stores::MemoryStore`].

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::EntityStore;
use crate::types::entity::EntityRecord;

/// `count` records named `"<prefix> 0"`, `"<prefix> 1"`, ...
pub fn numbered_entities(prefix: &str, count: usize) -> Vec<EntityRecord> {
    (0..count)
        .map(|i| {
            EntityRecord::new(format!("{prefix} {i}"))
                .with_rating("4.0/5")
                .with_address(format!("{i} Test Street"))
        })
        .collect()
}

/// A store whose writes always fail, as if its path were read-only.
pub struct FailingStore {
    path: PathBuf,
}

impl FailingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EntityStore for FailingStore {
    async fn load_all(&self) -> Vec<EntityRecord> {
        Vec::new()
    }

    async fn append_new(&self, _candidates: &[EntityRecord]) -> StoreResult<usize> {
        Err(StoreError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
