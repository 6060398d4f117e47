use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL_NAME: &str = "llama3.2:3b";
pub const DEFAULT_MODEL_PROVIDER: &str = "ollama";
pub const DEFAULT_MODEL_SETTINGS: &str = r#"{"url": "http://127.0.0.1:11434"}"#;

/// Config key holding the name of the active model
pub const ACTIVE_MODEL_KEY: &str = "active_model";

pub const SYSTEM_PROMPT: &str = "You are an experienced programmer. You excel at solving problems. \
Don't add superfluous comments or escape codes to the code. Utilize the available tools to fulfill \
prompt's requirements. Always check whether files need reloading before writing them: entries \
returned by list_dir and list_current_dir carry a 'synced' flag, and a file whose flag is false \
changed since you last read it. Provide relatively short summary. Always, with every prompt, refer \
to DEVNOTES.md file if it exists for information about steps that were taken earlier, and always \
update it at the end (create it if it's missing).";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Provider not implemented: {0}")]
    UnknownProvider(String),

    #[error("Malformed settings for provider {provider}: {reason}")]
    MalformedSettings { provider: String, reason: String },

    #[error("Model not found: {0}")]
    UnknownModel(String),
}

/// Application settings, loaded from `~/.tldc/settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// SQLite database holding models, history and sync status
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Upper bound on model round trips for a single prompt
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Timeout applied to every provider HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Startup enumeration fails when the working directory holds more
    /// entries than this
    #[serde(default = "default_max_tracked_paths")]
    pub max_tracked_paths: usize,

    /// Paths, relative to the working directory, that are never tracked
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Basenames that are never tracked wherever they appear
    #[serde(default = "default_exclude_anywhere")]
    pub exclude_anywhere: Vec<String>,

    /// Replaces the built in system instruction
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_tool_rounds() -> usize {
    50
}

fn default_request_timeout_secs() -> u64 {
    3600
}

fn default_max_tracked_paths() -> usize {
    20_000
}

fn default_exclude() -> Vec<String> {
    [".git", ".idea", ".python-version", ".venv", "venv", "dist"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_anywhere() -> Vec<String> {
    vec!["__pycache__".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            max_tool_rounds: default_max_tool_rounds(),
            request_timeout_secs: default_request_timeout_secs(),
            max_tracked_paths: default_max_tracked_paths(),
            exclude: default_exclude(),
            exclude_anywhere: default_exclude_anywhere(),
            system_prompt: None,
        }
    }
}

impl Settings {
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT)
    }

    /// Configured database path, or `~/.config/tldc/tldc.db`
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
        Ok(home.join(".config").join("tldc").join("tldc.db"))
    }
}

/// Provider specific settings, parsed from a [`crate::persistence::ModelEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "ollama")]
    Ollama { url: String },
    #[serde(rename = "xai")]
    Xai {
        api_key: String,
        #[serde(default = "default_xai_base_url")]
        base_url: String,
    },
}

fn default_xai_base_url() -> String {
    "https://api.x.ai/v1".to_string()
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OllamaSettings {
    url: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct XaiSettings {
    api_key: String,
    #[serde(default = "default_xai_base_url")]
    base_url: String,
}

impl ProviderConfig {
    /// Builds the configuration of `provider` from its JSON settings.
    pub fn parse(provider: &str, settings: &str) -> Result<Self, ConfigError> {
        let malformed = |e: serde_json::Error| ConfigError::MalformedSettings {
            provider: provider.to_string(),
            reason: e.to_string(),
        };

        match provider {
            "ollama" => {
                let parsed: OllamaSettings = serde_json::from_str(settings).map_err(malformed)?;
                Ok(ProviderConfig::Ollama { url: parsed.url })
            }
            "xai" => {
                let parsed: XaiSettings = serde_json::from_str(settings).map_err(malformed)?;
                Ok(ProviderConfig::Xai {
                    api_key: parsed.api_key,
                    base_url: parsed.base_url,
                })
            }
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            ProviderConfig::Ollama { .. } => "ollama",
            ProviderConfig::Xai { .. } => "xai",
        }
    }
}
