// Configuration file handling

use crate::prefs::{DEFAULT_THEME_KEY, ONBOARDING_KEY};
use crate::storage::{StorageKind, validate_key};
use crate::store::TODOS_KEY;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_NAME: &str = "config.yml";
const APP_DIR: &str = "todostore";

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the store directory is created in
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    /// Storage key for the theme setting
    pub theme_key: String,
}

/// On-disk layout of `config.yml`; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSpec {
    data_dir: Option<PathBuf>,
    storage: Option<StorageKind>,
    theme_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            storage: StorageKind::default(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/todostore/config.yml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
    }

    /// `<data dir>/todostore`, or the current directory as a last resort
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(eyre!("Config file not found: {}", p.display()));
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "Loading config");
        let contents =
            fs::read_to_string(&path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse YAML, filling unset fields with defaults
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map
        let spec: FileSpec = if contents.trim().is_empty() {
            FileSpec::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let defaults = Self::default();
        let config = Self {
            data_dir: spec.data_dir.unwrap_or(defaults.data_dir),
            storage: spec.storage.unwrap_or(defaults.storage),
            theme_key: spec.theme_key.unwrap_or(defaults.theme_key),
        };

        validate_key(&config.theme_key).context("Invalid theme_key")?;
        if config.theme_key == TODOS_KEY || config.theme_key == ONBOARDING_KEY {
            return Err(eyre!("theme_key cannot reuse the reserved key {}", config.theme_key));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.theme_key, "todo-app-theme");
    }

    #[test]
    fn test_from_yaml_full() {
        let config = Config::from_yaml(
            "data_dir: /tmp/tasks\nstorage: file\ntheme_key: theme\n",
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tasks"));
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.theme_key, "theme");
    }

    #[test]
    fn test_from_yaml_partial_and_empty() {
        let config = Config::from_yaml("storage: memory\n").unwrap();
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.theme_key, DEFAULT_THEME_KEY);

        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_rejects_bad_values() {
        assert!(Config::from_yaml("storage: redis\n").is_err());
        assert!(Config::from_yaml("colour: blue\n").is_err());
        assert!(Config::from_yaml("theme_key: \"../theme\"\n").is_err());
    }

    #[test]
    fn test_from_yaml_rejects_reserved_theme_key() {
        assert!(Config::from_yaml("theme_key: todos\n").is_err());
        assert!(Config::from_yaml("theme_key: onboardingShown\n").is_err());
        assert!(Config::from_yaml("theme_key: todos-theme\n").is_ok());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "storage: file\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage, StorageKind::File);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
