use crate::settings::config::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings loaded from a TOML file. A missing file is created with the
/// defaults; a corrupt one is moved aside and replaced by them.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Loads `~/.tldc/settings.toml`
    pub fn new() -> Result<Self> {
        Self::from_path(Self::default_settings_path()?)
    }

    pub fn from_path(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            info!(?path, "Creating default settings");
            write_settings(&path, &Settings::default())?;
        }

        let settings = load_with_backup(&path)?;
        Ok(Self {
            settings_path: path,
            settings,
        })
    }

    pub fn default_settings_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".tldc").join("settings.toml"))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }
}

fn load_with_backup(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {path:?}"))?;

    match toml::from_str(&contents) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!(?path, %e, "Settings file is corrupt, replacing with defaults");

            let backup_path = path.with_extension("toml.backup");
            fs::rename(path, &backup_path).with_context(|| {
                format!("Failed to backup corrupted settings to {backup_path:?}")
            })?;

            let defaults = Settings::default();
            write_settings(path, &defaults)?;
            Ok(defaults)
        }
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }
    let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, contents).with_context(|| format!("Failed to write settings to {path:?}"))
}
