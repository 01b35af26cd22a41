//! XDG config store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Directory under the user config dir
const APP_DIR: &str = "voice-composer";

/// Config file at `$XDG_CONFIG_HOME/voice-composer/config.toml`
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.exists() {
            return Ok(AppConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(config)?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        let defaults = AppConfig::defaults();
        self.save(&defaults).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_path_is_under_app_dir() {
        let path = XdgConfigStore::new().path();
        assert!(path.ends_with("voice-composer/config.toml"));
    }

    #[test]
    fn parse_toml_reads_all_keys() {
        let content = r#"
max_duration = "2m"
stop_timeout = "3s"
audio_cues = true
discard_policy = "drop-last-committed"
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.max_duration, Some("2m".to_string()));
        assert_eq!(config.stop_timeout, Some("3s".to_string()));
        assert_eq!(config.audio_cues, Some(true));
        assert_eq!(config.discard_policy, Some("drop-last-committed".to_string()));
    }

    #[test]
    fn parse_toml_rejects_malformed_content() {
        let result = XdgConfigStore::parse_toml("max_duration = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        assert!(!store.exists());
        let config = store.load().await.unwrap();
        assert!(config.max_duration.is_none());
    }

    #[tokio::test]
    async fn save_creates_parent_dirs_and_reloads() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested/deeper/config.toml"));
        let config = AppConfig {
            max_duration: Some("90s".to_string()),
            audio_cues: Some(true),
            ..Default::default()
        };

        store.save(&config).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.max_duration, Some("90s".to_string()));
        assert_eq!(loaded.audio_cues, Some(true));
        assert!(loaded.stop_timeout.is_none());
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));

        store.init().await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.discard_policy, Some("keep-committed".to_string()));

        assert!(matches!(store.init().await, Err(ConfigError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn load_or_empty_swallows_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let store = XdgConfigStore::with_path(path);

        assert!(store.load().await.is_err());
        assert!(store.load_or_empty().await.audio_cues.is_none());
    }
}
