use crate::ai::Message;
use crate::persistence::Store;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Conversation state of one working directory: the message log and, for
/// stateful backends, the cursor of the last response. Everything lives in
/// the store; nothing is cached here.
#[derive(Clone)]
pub struct ConversationContext {
    key: String,
    store: Arc<dyn Store>,
}

impl ConversationContext {
    pub fn new(key: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn messages(&self) -> Result<Vec<Message>> {
        self.store
            .history(&self.key)
            .await?
            .iter()
            .map(|raw| {
                serde_json::from_str(raw)
                    .with_context(|| format!("Corrupt history entry in context {}", self.key))
            })
            .collect()
    }

    pub async fn append(&self, message: &Message) -> Result<()> {
        let raw = serde_json::to_string(message).context("Failed to serialize message")?;
        self.store.append_history(&self.key, &raw).await
    }

    pub async fn response_cursor(&self) -> Result<Option<String>> {
        self.store.response_cursor(&self.key).await
    }

    pub async fn set_response_cursor(&self, cursor: &str) -> Result<()> {
        self.store.set_response_cursor(&self.key, cursor).await
    }

    pub async fn clear_response_cursor(&self) -> Result<()> {
        self.store.clear_response_cursor(&self.key).await
    }

    /// Drops the message log and the response cursor.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear_history(&self.key).await?;
        self.store.clear_response_cursor(&self.key).await
    }
}
