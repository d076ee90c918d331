//! Seen-set storage for record deduplication.
//!
//! The seen-set is the single arbiter of "already emitted". Every lookup and
//! insertion goes through [`SeenStore`].
//!
//! - [`MemorySeenStore`]: process memory, lost on restart
//! - [`LocalSeenStore`]: JSON file, survives restarts
//!
//! ## File Layout
//!
//! ```text
//! {storage_dir}/
//! ├── config.toml           # Relay configuration
//! └── seen.json             # Seen-set: identity -> first-seen timestamp
//! ```

pub mod local;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RecordIdentity, StorageConfig, StorageKind};

// Re-export for convenience
pub use local::LocalSeenStore;
pub use memory::MemorySeenStore;

/// Trait for seen-set backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// True iff the identity was recorded before.
    async fn is_seen(&self, identity: &RecordIdentity) -> Result<bool>;

    /// Record the identity. Calling twice has no additional effect.
    async fn mark_seen(&self, identity: &RecordIdentity) -> Result<()>;

    /// Record many identities at once. Backends with costly writes should
    /// override this to persist once per call.
    async fn mark_seen_all(&self, identities: &[RecordIdentity]) -> Result<()> {
        for identity in identities {
            self.mark_seen(identity).await?;
        }
        Ok(())
    }

    /// Number of recorded identities.
    async fn len(&self) -> Result<usize>;

    /// Whether the store survives a restart.
    fn is_persistent(&self) -> bool;
}

/// Open the configured seen-set backend.
pub async fn open_store(config: &StorageConfig, storage_dir: &Path) -> Result<Arc<dyn SeenStore>> {
    match config.kind {
        StorageKind::Memory => {
            log::info!("Using in-memory seen-set (lost on restart)");
            Ok(Arc::new(MemorySeenStore::new()))
        }
        StorageKind::File => {
            let store = LocalSeenStore::open(storage_dir.join(&config.path)).await?;
            Ok(Arc::new(store))
        }
    }
}
