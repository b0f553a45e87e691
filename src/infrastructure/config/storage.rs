use super::app_config::AppConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const APP_QUALIFIER: &str = "rs";
const APP_ORGANIZATION: &str = "chatkit";
const APP_NAME: &str = "chatkit";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Create a new `StorageManager`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    /// Creates a new `StorageManager` with a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!("Creating configuration directory at {:?}", self.config_dir);
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Loads the application configuration, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        self.ensure_config_dir()?;
        let config_path = path_override.map_or_else(
            || self.config_dir.join(CONFIG_FILE_NAME),
            std::path::Path::to_path_buf,
        );

        if !config_path.exists() {
            info!(path = %config_path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "Config parse failed");
                Err(ConfigError::TomlDe(e))
            }
        }
    }

    /// Writes the configuration back to disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_config_dir()?;
        let config_path = self.config_dir.join(CONFIG_FILE_NAME);
        let contents = toml::to_string_pretty(config)?;
        fs::write(&config_path, contents)?;
        info!(path = %config_path.display(), "Saved configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(temp.path().to_path_buf());

        let config = storage.load_config(None).unwrap();
        assert_eq!(config.conversation.title, "Chat");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(temp.path().to_path_buf());

        let mut config = AppConfig::default();
        config.conversation.title = "Alice".to_string();
        config.theme.accent_color = "Cyan".to_string();
        storage.save_config(&config).unwrap();

        let reloaded = storage.load_config(None).unwrap();
        assert_eq!(reloaded.conversation.title, "Alice");
        assert_eq!(reloaded.theme.accent_color, "Cyan");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(temp.path().to_path_buf());

        let path = temp.path().join("config.toml");
        fs::write(&path, "log_level = 42").unwrap();

        assert!(storage.load_config(None).is_err());
    }
}
