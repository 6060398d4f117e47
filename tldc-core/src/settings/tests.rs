use crate::settings::config::{ConfigError, ProviderConfig, SYSTEM_PROMPT};
use crate::settings::manager::SettingsManager;
use crate::settings::Settings;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("nested").join("settings.toml");

    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    assert!(settings_path.exists());
    assert_eq!(manager.settings(), &Settings::default());
    assert_eq!(manager.path(), settings_path.as_path());
}

#[test]
fn test_partial_file_uses_defaults_for_missing_fields() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    std::fs::write(&settings_path, "max_tool_rounds = 7\n").unwrap();

    let manager = SettingsManager::from_path(settings_path).unwrap();
    let settings = manager.into_settings();

    assert_eq!(settings.max_tool_rounds, 7);
    assert_eq!(settings.request_timeout_secs, 3600);
    assert!(settings.exclude.contains(&".git".to_string()));
    assert_eq!(settings.exclude_anywhere, vec!["__pycache__".to_string()]);
}

#[test]
fn test_corrupt_file_is_backed_up() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    std::fs::write(&settings_path, "max_tool_rounds = [not toml").unwrap();

    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    assert_eq!(manager.settings(), &Settings::default());
    assert!(temp_dir.path().join("settings.toml.backup").exists());
    assert!(settings_path.exists());
}

#[test]
fn test_valid_file_is_left_alone() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    let contents = "max_tracked_paths = 12\nexclude_anywhere = [\"target\"]\n";
    std::fs::write(&settings_path, contents).unwrap();

    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    assert_eq!(manager.settings().max_tracked_paths, 12);
    assert_eq!(manager.settings().exclude_anywhere, vec!["target".to_string()]);
    assert_eq!(std::fs::read_to_string(&settings_path).unwrap(), contents);
}

#[test]
fn test_system_prompt_override() {
    let mut settings = Settings::default();
    assert_eq!(settings.system_prompt(), SYSTEM_PROMPT);

    settings.system_prompt = Some("be brief".to_string());
    assert_eq!(settings.system_prompt(), "be brief");
}

#[test]
fn test_parse_provider_configs() {
    let ollama = ProviderConfig::parse("ollama", r#"{"url": "http://localhost:11434"}"#).unwrap();
    assert_eq!(
        ollama,
        ProviderConfig::Ollama {
            url: "http://localhost:11434".to_string()
        }
    );

    let xai = ProviderConfig::parse("xai", r#"{"api_key": "secret"}"#).unwrap();
    assert_eq!(
        xai,
        ProviderConfig::Xai {
            api_key: "secret".to_string(),
            base_url: "https://api.x.ai/v1".to_string(),
        }
    );
}

#[test]
fn test_parse_provider_config_errors() {
    assert!(matches!(
        ProviderConfig::parse("openai", "{}"),
        Err(ConfigError::UnknownProvider(name)) if name == "openai"
    ));
    assert!(matches!(
        ProviderConfig::parse("ollama", r#"{"uri": "x"}"#),
        Err(ConfigError::MalformedSettings { .. })
    ));
    assert!(matches!(
        ProviderConfig::parse("xai", "not json"),
        Err(ConfigError::MalformedSettings { .. })
    ));
}
