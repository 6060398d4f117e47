use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// The backend refused the request because of the attached tool
    /// definitions. Stateless adapters recover by retrying once without tools.
    #[error("Tool schema rejected: {0}")]
    SchemaRejected(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Terminal error: {0:#}")]
    Terminal(anyhow::Error),
}

impl From<serde_json::Error> for AiError {
    fn from(source: serde_json::Error) -> Self {
        Self::Terminal(anyhow!(source))
    }
}

impl From<reqwest::Error> for AiError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout(source.to_string())
        } else {
            Self::Terminal(anyhow!("Network error: {source}"))
        }
    }
}
