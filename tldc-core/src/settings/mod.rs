pub mod config;
pub mod manager;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, ProviderConfig, Settings};
pub use manager::SettingsManager;
