use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Last known checksum of a path and whether the assistant has confirmed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub checksum: String,
    pub synced: bool,
}

impl SyncRecord {
    pub fn new(checksum: impl Into<String>, synced: bool) -> Self {
        Self {
            checksum: checksum.into(),
            synced,
        }
    }
}

/// A registered model: the provider that serves it and its provider-specific
/// settings as a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub provider: String,
    pub settings: String,
}

impl ModelEntry {
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        settings: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            settings: settings.into(),
        }
    }
}

/// Every write is expected to be atomic: it either lands completely or the
/// call returns an error and nothing changed.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn config_value(&self, key: &str) -> Result<Option<String>>;
    async fn set_config_value(&self, key: &str, value: &str) -> Result<()>;

    async fn models(&self) -> Result<Vec<ModelEntry>>;
    async fn model(&self, name: &str) -> Result<Option<ModelEntry>>;
    async fn add_model(&self, entry: &ModelEntry) -> Result<()>;
    /// Returns whether a model was actually removed
    async fn delete_model(&self, name: &str) -> Result<bool>;

    /// Serialized messages of a context in insertion order
    async fn history(&self, context: &str) -> Result<Vec<String>>;
    async fn append_history(&self, context: &str, message: &str) -> Result<()>;
    async fn clear_history(&self, context: &str) -> Result<()>;

    async fn response_cursor(&self, context: &str) -> Result<Option<String>>;
    async fn set_response_cursor(&self, context: &str, cursor: &str) -> Result<()>;
    async fn clear_response_cursor(&self, context: &str) -> Result<()>;

    async fn sync_record(&self, path: &str) -> Result<Option<SyncRecord>>;
    async fn set_sync_record(&self, path: &str, record: &SyncRecord) -> Result<()>;
    /// Marks `prefix` itself and every path below it as not synced. Returns
    /// the number of records touched.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64>;
}
