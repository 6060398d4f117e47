use crate::file::tree::WorkingDirectory;
use crate::persistence::{Store, SyncRecord};
use crate::sync::checksum;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Persistent per-path checksums with a synced flag.
///
/// Paths are keyed by their absolute location under the working directory
/// root. Every state change is written to the store before the call returns.
pub struct StalenessCache {
    tree: WorkingDirectory,
    store: Arc<dyn Store>,
}

impl StalenessCache {
    /// Enumerates the working directory and refreshes every visible path, so
    /// changes made while the assistant was not running are noticed.
    pub async fn new(
        tree: WorkingDirectory,
        store: Arc<dyn Store>,
        max_paths: usize,
    ) -> Result<Self> {
        let paths = tree.enumerate(max_paths)?;
        let cache = Self { tree, store };

        let mut stale = 0usize;
        for path in &paths {
            if !cache.refresh(path).await? {
                stale += 1;
            }
        }

        info!(
            root = %cache.tree.root().display(),
            tracked = paths.len(),
            stale,
            "Staleness cache initialized"
        );
        Ok(cache)
    }

    pub fn tree(&self) -> &WorkingDirectory {
        &self.tree
    }

    pub async fn checksum(&self, path: &Path) -> String {
        checksum::checksum(&self.tree, path).await
    }

    pub async fn record(&self, path: &Path) -> Result<Option<SyncRecord>> {
        self.store.sync_record(&key(path)).await
    }

    /// Recomputes the checksum of `path`. A changed or previously unknown
    /// checksum clears the synced flag. Returns the flag afterwards.
    pub async fn refresh(&self, path: &Path) -> Result<bool> {
        let key = key(path);
        let current = self.checksum(path).await;

        match self.store.sync_record(&key).await? {
            Some(record) if record.checksum == current => Ok(record.synced),
            previous => {
                if previous.is_some() {
                    debug!(path = %key, "Checksum changed");
                }
                self.store
                    .set_sync_record(&key, &SyncRecord::new(current, false))
                    .await?;
                Ok(false)
            }
        }
    }

    /// Whether the assistant has seen the current content of `path`.
    pub async fn is_synced(&self, path: &Path) -> Result<bool> {
        self.refresh(path).await
    }

    /// Records the current checksum of `path` as seen by the assistant.
    pub async fn mark_synced(&self, path: &Path) -> Result<()> {
        let current = self.checksum(path).await;
        self.store
            .set_sync_record(&key(path), &SyncRecord::new(current, true))
            .await
    }

    /// Clears the synced flag of every directory between `path` and the
    /// root, the root included. `path` itself is left alone.
    pub async fn invalidate_ancestors(&self, path: &Path) -> Result<()> {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.starts_with(self.tree.root()) {
                break;
            }

            let key = key(ancestor);
            let checksum = match self.store.sync_record(&key).await? {
                Some(record) => record.checksum,
                None => self.checksum(ancestor).await,
            };
            self.store
                .set_sync_record(&key, &SyncRecord::new(checksum, false))
                .await?;
        }
        Ok(())
    }

    /// Clears the synced flag of every tracked path.
    pub async fn invalidate_all(&self) -> Result<u64> {
        let touched = self.store.invalidate_prefix(&key(self.tree.root())).await?;
        debug!(touched, "Invalidated all sync records");
        Ok(touched)
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
