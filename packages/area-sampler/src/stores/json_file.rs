//! Durable JSON file store.
//!
//! The file holds a pretty-printed JSON array of entity objects. Appending
//! is a read-merge-write cycle: load everything, add the records with unseen
//! keys, and rewrite the whole file through a temp file and an atomic rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{distinct_new, EntityStore};
use crate::types::entity::EntityRecord;

/// What was found on disk.
enum Snapshot {
    Missing,
    Loaded(Vec<EntityRecord>),
    /// Readable but not a valid record array
    Corrupt(String),
    /// Exists but could not be read
    Unreadable(std::io::Error),
}

/// Entity store backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-merge-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn snapshot(&self) -> Snapshot {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<EntityRecord>>(&bytes) {
                Ok(records) => Snapshot::Loaded(records),
                Err(e) => Snapshot::Corrupt(e.to_string()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Snapshot::Missing,
            Err(e) => Snapshot::Unreadable(e),
        }
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }

    /// Move a corrupt file aside so the rewrite does not destroy it.
    async fn quarantine(&self) -> StoreResult<PathBuf> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string();
        let mut target = sibling_path(&self.path, &format!("corrupt-{stamp}"));
        let mut attempt = 1;
        while fs::try_exists(&target).await.unwrap_or(false) {
            target = sibling_path(&self.path, &format!("corrupt-{stamp}-{attempt}"));
            attempt += 1;
        }
        fs::rename(&self.path, &target)
            .await
            .map_err(|e| self.write_error(e))?;
        warn!(
            path = %self.path.display(),
            moved_to = %target.display(),
            "Moved corrupt result store aside"
        );
        Ok(target)
    }

    async fn write_records(&self, records: &[EntityRecord]) -> StoreResult<()> {
        let bytes = to_pretty_json(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.write_error(e))?;
            }
        }

        let temp_path = sibling_path(&self.path, "tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| self.write_error(e))?;
        file.sync_all().await.map_err(|e| self.write_error(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for JsonFileStore {
    async fn load_all(&self) -> Vec<EntityRecord> {
        match self.snapshot().await {
            Snapshot::Loaded(records) => records,
            Snapshot::Missing => {
                debug!(path = %self.path.display(), "Result store does not exist yet");
                Vec::new()
            }
            Snapshot::Corrupt(reason) => {
                warn!(path = %self.path.display(), %reason, "Treating corrupt result store as empty");
                Vec::new()
            }
            Snapshot::Unreadable(e) => {
                warn!(path = %self.path.display(), error = %e, "Treating unreadable result store as empty");
                Vec::new()
            }
        }
    }

    async fn append_new(&self, candidates: &[EntityRecord]) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;

        let (mut records, corrupt) = match self.snapshot().await {
            Snapshot::Loaded(records) => (records, false),
            Snapshot::Missing => (Vec::new(), false),
            Snapshot::Corrupt(reason) => {
                warn!(path = %self.path.display(), %reason, "Treating corrupt result store as empty");
                (Vec::new(), true)
            }
            // Rewriting would replace contents we never saw.
            Snapshot::Unreadable(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let fresh = distinct_new(&records, candidates);
        if fresh.is_empty() {
            debug!(path = %self.path.display(), "No new entries to save");
            return Ok(0);
        }

        if corrupt {
            self.quarantine().await?;
        }

        let count = fresh.len();
        records.extend(fresh);
        self.write_records(&records).await?;

        info!(count, total = records.len(), path = %self.path.display(), "Saved new entries");
        Ok(count)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// `<path>.<suffix>` next to `path`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Four-space indented JSON with non-ASCII left unescaped.
fn to_pretty_json(records: &[EntityRecord]) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}
