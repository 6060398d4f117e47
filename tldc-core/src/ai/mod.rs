pub mod error;
pub mod mock;
pub mod ollama;
pub mod provider;
pub mod types;
pub mod xai;

#[cfg(test)]
mod test_server;

pub use error::AiError;
pub use provider::AiProvider;
pub use types::*;

use crate::settings::ProviderConfig;
use std::sync::Arc;
use std::time::Duration;

/// Builds the adapter serving `model` from its parsed provider settings.
pub fn create_provider(
    config: &ProviderConfig,
    model: &str,
    timeout: Duration,
) -> Result<Arc<dyn AiProvider>, AiError> {
    let provider: Arc<dyn AiProvider> = match config {
        ProviderConfig::Ollama { url } => Arc::new(ollama::OllamaProvider::new(
            url.clone(),
            model.to_string(),
            timeout,
        )?),
        ProviderConfig::Xai { api_key, base_url } => Arc::new(xai::XaiProvider::new(
            api_key.clone(),
            base_url.clone(),
            model.to_string(),
            timeout,
        )?),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_by_config() {
        let timeout = Duration::from_secs(1);

        let ollama = ProviderConfig::Ollama {
            url: "http://127.0.0.1:11434".to_string(),
        };
        assert_eq!(create_provider(&ollama, "llama3.2:3b", timeout).unwrap().name(), "ollama");

        let xai = ProviderConfig::Xai {
            api_key: "key".to_string(),
            base_url: "https://api.x.ai/v1".to_string(),
        };
        assert_eq!(create_provider(&xai, "grok-4", timeout).unwrap().name(), "xai");
    }
}
