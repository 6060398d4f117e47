use crate::ai::{create_provider, AiProvider};
use crate::chat::{ContextLocks, ConversationContext, Orchestrator};
use crate::file::exclude::Exclusions;
use crate::file::{FileAccessGateway, WorkingDirectory};
use crate::persistence::{ModelEntry, SqliteStore, Store};
use crate::settings::config::{ACTIVE_MODEL_KEY, DEFAULT_MODEL_NAME};
use crate::settings::{ConfigError, ProviderConfig, Settings};
use crate::sync::StalenessCache;
use crate::tools::ToolRegistry;
use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything one invocation works with: settings, the store and the working
/// directory. Built once and passed around explicitly.
pub struct Session {
    settings: Settings,
    store: Arc<dyn Store>,
    workdir: WorkingDirectory,
    locks: ContextLocks,
}

impl Session {
    /// Opens the database configured in `settings`.
    pub async fn open(settings: Settings, workdir: &Path) -> Result<Self> {
        let database = settings.database_path()?;
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&database).await?);
        Self::with_store(settings, store, workdir)
    }

    pub fn with_store(settings: Settings, store: Arc<dyn Store>, workdir: &Path) -> Result<Self> {
        let workdir = WorkingDirectory::new(workdir, Exclusions::from_settings(&settings))?;
        Ok(Self {
            settings,
            store,
            workdir,
            locks: ContextLocks::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.root()
    }

    /// Conversations are keyed by the canonical working directory
    pub fn context(&self) -> ConversationContext {
        ConversationContext::new(
            self.workdir.root().to_string_lossy().into_owned(),
            self.store.clone(),
        )
    }

    pub async fn models(&self) -> Result<Vec<ModelEntry>> {
        self.store.models().await
    }

    /// Registers a model after checking that its provider exists and its
    /// settings parse.
    pub async fn add_model(&self, name: &str, provider: &str, settings: &str) -> Result<()> {
        ProviderConfig::parse(provider, settings)?;
        self.store
            .add_model(&ModelEntry::new(name, provider, settings))
            .await?;
        info!(model = name, provider, "Model added");
        Ok(())
    }

    /// Returns whether a model was removed. Deleting the active model makes
    /// the default model active again.
    pub async fn delete_model(&self, name: &str) -> Result<bool> {
        if name == DEFAULT_MODEL_NAME {
            bail!("The default model {name} cannot be deleted");
        }

        let active = self.store.config_value(ACTIVE_MODEL_KEY).await?;
        let removed = self.store.delete_model(name).await?;
        if removed && active.as_deref() == Some(name) {
            warn!(model = name, "Deleted the active model, falling back to {DEFAULT_MODEL_NAME}");
            self.store
                .set_config_value(ACTIVE_MODEL_KEY, DEFAULT_MODEL_NAME)
                .await?;
        }
        Ok(removed)
    }

    pub async fn active_model(&self) -> Result<ModelEntry> {
        let name = self
            .store
            .config_value(ACTIVE_MODEL_KEY)
            .await?
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());

        match self.store.model(&name).await? {
            Some(entry) => Ok(entry),
            None => Err(ConfigError::UnknownModel(name).into()),
        }
    }

    pub async fn set_active_model(&self, name: &str) -> Result<()> {
        if self.store.model(name).await?.is_none() {
            return Err(ConfigError::UnknownModel(name.to_string()).into());
        }
        self.store.set_config_value(ACTIVE_MODEL_KEY, name).await
    }

    /// Adapter for the active model
    pub async fn provider(&self) -> Result<Arc<dyn AiProvider>> {
        let model = self.active_model().await?;
        let config = ProviderConfig::parse(&model.provider, &model.settings)?;
        let timeout = Duration::from_secs(self.settings.request_timeout_secs);
        Ok(create_provider(&config, &model.name, timeout)?)
    }

    /// Orchestrator for the working directory using the active model.
    pub async fn orchestrator(&self) -> Result<Orchestrator> {
        let provider = self.provider().await?;
        self.orchestrator_with_provider(provider).await
    }

    /// Enumerates the working directory, so every change made since the last
    /// invocation is reflected in the staleness cache.
    pub async fn orchestrator_with_provider(
        &self,
        provider: Arc<dyn AiProvider>,
    ) -> Result<Orchestrator> {
        let cache = Arc::new(
            StalenessCache::new(
                self.workdir.clone(),
                self.store.clone(),
                self.settings.max_tracked_paths,
            )
            .await?,
        );
        let registry = ToolRegistry::file_tools(FileAccessGateway::new(cache.clone()));

        Ok(
            Orchestrator::new(provider, registry, self.context(), cache)
                .with_system_prompt(self.settings.system_prompt())
                .with_max_tool_rounds(self.settings.max_tool_rounds)
                .with_locks(self.locks.clone()),
        )
    }

    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        let orchestrator = self.orchestrator().await?;
        Ok(orchestrator.prompt(prompt).await?)
    }

    pub async fn reset(&self) -> Result<()> {
        let orchestrator = self.orchestrator().await?;
        Ok(orchestrator.reset().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn session(temp: &TempDir) -> Session {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        Session::with_store(Settings::default(), store, temp.path()).unwrap()
    }

    #[tokio::test]
    async fn test_default_model_is_active() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp).await;

        let active = session.active_model().await.unwrap();
        assert_eq!(active.name, "llama3.2:3b");
        assert_eq!(active.provider, "ollama");
        assert_eq!(session.provider().await.unwrap().name(), "ollama");
    }

    #[tokio::test]
    async fn test_add_validates_provider_and_settings() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp).await;

        assert!(session.add_model("gpt", "openai", "{}").await.is_err());
        assert!(session.add_model("grok-4", "xai", "{}").await.is_err());
        session
            .add_model("grok-4", "xai", r#"{"api_key": "k"}"#)
            .await
            .unwrap();

        let names: Vec<String> = session
            .models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["grok-4", "llama3.2:3b"]);
    }

    #[tokio::test]
    async fn test_set_active_requires_existing_model() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp).await;

        let err = session.set_active_model("missing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownModel(name)) if name == "missing"
        ));

        session
            .add_model("grok-4", "xai", r#"{"api_key": "k"}"#)
            .await
            .unwrap();
        session.set_active_model("grok-4").await.unwrap();
        assert_eq!(session.active_model().await.unwrap().name, "grok-4");
        assert_eq!(session.provider().await.unwrap().name(), "xai");
    }

    #[tokio::test]
    async fn test_delete_model() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp).await;

        assert!(session.delete_model(DEFAULT_MODEL_NAME).await.is_err());
        assert!(!session.delete_model("absent").await.unwrap());

        session
            .add_model("grok-4", "xai", r#"{"api_key": "k"}"#)
            .await
            .unwrap();
        session.set_active_model("grok-4").await.unwrap();
        assert!(session.delete_model("grok-4").await.unwrap());
        assert_eq!(
            session.active_model().await.unwrap().name,
            DEFAULT_MODEL_NAME
        );
    }

    #[tokio::test]
    async fn test_context_is_keyed_by_canonical_workdir() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp).await;
        let canonical = temp.path().canonicalize().unwrap();
        assert_eq!(session.context().key(), canonical.to_string_lossy());
    }
}
