//! Application configuration read from `config.toml` in the data directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autosave::DEFAULT_DEBOUNCE;
use crate::storage::{DocumentStore, FileStorage, LocalKeyStorage, DOCUMENT_FILE};

pub const CONFIG_FILE: &str = "config.toml";

/// Overrides the data directory from the config file
pub const DATA_DIR_ENV: &str = "SIDENOTE_DATA_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Where the document lives; the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub document_file: String,
    pub autosave_debounce_ms: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            document_file: DOCUMENT_FILE.to_string(),
            autosave_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default location, honouring `SIDENOTE_DATA_DIR`.
    ///
    /// The config file is looked up in the overridden directory when the
    /// variable is set, otherwise in the platform data directory. Runs
    /// before any logger exists, so problems come back as warnings for the
    /// caller to log once it has one.
    pub fn load() -> (Self, Vec<String>) {
        let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let base = env_dir.clone().or_else(|| FileStorage::default_data_dir().ok());

        let (mut config, warnings) = match base {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => (Self::default(), Vec::new()),
        };
        config.apply_data_dir_override(env_dir);
        (config, warnings)
    }

    /// Read a config file. A missing file gives the defaults; an invalid
    /// one gives the defaults and a warning.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        if !path.exists() {
            return (Self::default(), Vec::new());
        }
        match Self::read(path) {
            Ok(config) => {
                let warnings = config.check();
                (config, warnings)
            }
            Err(e) => (Self::default(), vec![format!("Ignoring config {:?}: {}", path, e)]),
        }
    }

    /// Values that parse but will be replaced by a fallback
    fn check(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            warnings.push(format!("Unknown log level '{}', using info", self.log_level));
        }
        warnings
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn apply_data_dir_override(&mut self, dir: Option<PathBuf>) {
        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            self.data_dir = Some(dir);
        }
    }

    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| FileStorage::default_data_dir().ok())
    }

    pub fn document_path(&self) -> Option<PathBuf> {
        self.resolve_data_dir().map(|dir| dir.join(&self.document_file))
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Falls back to info; [`AppConfig::load`] reports the bad value
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// The document file when a data directory exists, otherwise the
    /// in-process keyed store
    pub fn open_store(&self) -> Arc<dyn DocumentStore> {
        match self.document_path() {
            Some(path) => Arc::new(FileStorage::with_file(path)),
            None => {
                log::warn!("No data directory available, documents will not outlive this session");
                Arc::new(LocalKeyStorage::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = AppConfig::load_from(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
        assert_eq!(config.autosave_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "autosave_debounce_ms = 1000\nlog_level = \"debug\"\n").unwrap();

        let (config, warnings) = AppConfig::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(config.autosave_debounce_ms, 1000);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.document_file, DOCUMENT_FILE);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "autosave_debounce_ms = \"soon\"").unwrap();

        let (config, warnings) = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Ignoring config"));
    }

    #[test]
    fn test_unknown_log_level_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "log_level = \"chatty\"\n").unwrap();

        let (config, warnings) = AppConfig::load_from(&path);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
        assert_eq!(warnings, vec!["Unknown log level 'chatty', using info".to_string()]);
    }

    #[test]
    fn test_override_and_document_path() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig {
            document_file: "notes.json".to_string(),
            ..AppConfig::default()
        };

        config.apply_data_dir_override(Some(PathBuf::new()));
        assert_eq!(config.data_dir, None);

        config.apply_data_dir_override(Some(dir.path().to_path_buf()));
        assert_eq!(config.document_path(), Some(dir.path().join("notes.json")));
    }

    #[test]
    fn test_store_roundtrip_through_config() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().join("nested")),
            ..AppConfig::default()
        };

        let store = config.open_store();
        assert!(store.load().is_none());

        let tree = crate::tree::DocumentTree::default_tree();
        store.save(&tree.to_document()).unwrap();
        assert_eq!(store.load(), Some(tree.to_document()));
    }
}
