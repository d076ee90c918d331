//! In-memory seen-set.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::RecordIdentity;
use crate::storage::SeenStore;

/// Seen-set held in process memory.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insertion time of an identity, if recorded.
    pub fn first_seen(&self, identity: &RecordIdentity) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(identity.as_str()).copied())
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn is_seen(&self, identity: &RecordIdentity) -> Result<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::store("seen-set lock poisoned"))?;
        Ok(entries.contains_key(identity.as_str()))
    }

    async fn mark_seen(&self, identity: &RecordIdentity) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::store("seen-set lock poisoned"))?;
        entries
            .entry(identity.as_str().to_string())
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn mark_seen_all(&self, identities: &[RecordIdentity]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::store("seen-set lock poisoned"))?;
        let now = Utc::now();
        for identity in identities {
            entries.entry(identity.as_str().to_string()).or_insert(now);
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::store("seen-set lock poisoned"))?;
        Ok(entries.len())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
