//! Oracle Settings
//!
//! Each binary defines its own config type and uses `Settings<T>` to persist it as
//! pretty-printed JSON.

use std::fs;
use std::path::{Path, PathBuf};

use oracle_keystore::default_config_dir_for;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(String),
    #[error("Failed to write settings: {0}")]
    WriteError(String),
    #[error("Failed to parse settings: {0}")]
    ParseError(String),
    #[error("Failed to create directory: {0}")]
    CreateDirError(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// A config value bound to the file it was loaded from.
pub struct Settings<T> {
    pub config: T,
    path: PathBuf,
}

impl<T: Serialize + DeserializeOwned> Settings<T> {
    /// Load settings from an existing file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let content =
            fs::read_to_string(path).map_err(|e| SettingsError::ReadError(e.to_string()))?;
        let config =
            serde_json::from_str(&content).map_err(|e| SettingsError::ParseError(e.to_string()))?;
        Ok(Self {
            config,
            path: path.to_path_buf(),
        })
    }

    /// Save current settings to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SettingsError::CreateDirError(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| SettingsError::WriteError(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| SettingsError::WriteError(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned + Default> Settings<T> {
    /// Load settings from `custom_path` or the service default, writing defaults
    /// if the file does not exist yet.
    pub fn load_or_default(service: &str, custom_path: Option<&Path>) -> Result<Self> {
        let path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => default_settings_path(service),
        };

        if path.exists() {
            return Self::load(&path);
        }

        debug!("Creating default settings at {}", path.display());
        let settings = Self {
            config: T::default(),
            path,
        };
        settings.save()?;
        Ok(settings)
    }
}

/// Default settings file for a service.
pub fn default_settings_path(service: &str) -> PathBuf {
    default_config_dir_for(service).join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    struct TestConfig {
        endpoint: String,
        app_id: u64,
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_load_or_default_creates_file() {
        let dir = temp_dir("oracle-settings-test");
        let path = dir.join("settings.json");

        let settings: Settings<TestConfig> =
            Settings::load_or_default("test", Some(&path)).unwrap();
        assert_eq!(settings.config, TestConfig::default());
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let dir = temp_dir("oracle-settings-test-existing");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(
            &path,
            r#"{ "endpoint": "https://ledger.example", "app_id": 228009344 }"#,
        )
        .unwrap();

        let settings: Settings<TestConfig> =
            Settings::load_or_default("test", Some(&path)).unwrap();
        assert_eq!(settings.config.endpoint, "https://ledger.example");
        settings.save().unwrap();

        let loaded: Settings<TestConfig> = Settings::load(&path).unwrap();
        assert_eq!(loaded.config.endpoint, "https://ledger.example");
        assert_eq!(loaded.config.app_id, 228009344);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parse_error() {
        let dir = temp_dir("oracle-settings-test-parse");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Settings<TestConfig>> = Settings::load(&path);
        assert!(matches!(result, Err(SettingsError::ParseError(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_settings_path() {
        assert!(default_settings_path("oracle-request").ends_with("settings.json"));
    }
}
