//! Local filesystem seen-set.
//!
//! Keeps the seen-set in memory and writes it through to a JSON file on
//! every call that adds something. A batch is written once. Writes are atomic (temp file, then rename) so a
//! crash mid-write leaves the previous snapshot intact.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "updated_at": "2026-01-01T10:00:00Z",
//!   "count": 1,
//!   "entries": { "923001234567_2024-01-01 10:00": "2026-01-01T10:00:00Z" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::RecordIdentity;
use crate::storage::SeenStore;

/// On-disk representation of the seen-set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeenFile {
    /// Timestamp of the last write
    pub updated_at: Option<DateTime<Utc>>,
    /// Entry count
    pub count: usize,
    /// Identity -> first-seen time
    pub entries: BTreeMap<String, DateTime<Utc>>,
}

/// Borrowed view of [`SeenFile`] used when writing.
#[derive(Serialize)]
struct SeenFileRef<'a> {
    updated_at: DateTime<Utc>,
    count: usize,
    entries: &'a BTreeMap<String, DateTime<Utc>>,
}

/// File-backed seen-set.
pub struct LocalSeenStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, DateTime<Utc>>>,
    writes: AtomicUsize,
}

impl LocalSeenStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: SeenFile = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::store(format!("Corrupt seen-set at {}: {}", path.display(), e))
                })?;
                log::info!(
                    "Loaded {} seen identities from {}",
                    file.entries.len(),
                    path.display()
                );
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No seen-set at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of file writes since the store was opened.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn persist(&self, entries: &BTreeMap<String, DateTime<Utc>>) -> Result<()> {
        let snapshot = SeenFileRef {
            updated_at: Utc::now(),
            count: entries.len(),
            entries,
        };
        let bytes = serde_json::to_vec(&snapshot)?;
        self.write_bytes(&bytes).await?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl SeenStore for LocalSeenStore {
    async fn is_seen(&self, identity: &RecordIdentity) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(identity.as_str()))
    }

    async fn mark_seen(&self, identity: &RecordIdentity) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(identity.as_str()) {
            return Ok(());
        }

        // Kept in memory even if the write fails so this process never re-emits it.
        entries.insert(identity.as_str().to_string(), Utc::now());
        self.persist(&entries).await
    }

    async fn mark_seen_all(&self, identities: &[RecordIdentity]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        let mut added = 0;
        for identity in identities {
            if !entries.contains_key(identity.as_str()) {
                entries.insert(identity.as_str().to_string(), now);
                added += 1;
            }
        }

        if added == 0 {
            return Ok(());
        }
        self.persist(&entries).await
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.lock().await.len())
    }

    fn is_persistent(&self) -> bool {
        true
    }
}
