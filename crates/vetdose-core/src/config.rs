//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vetdose/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::WeightUnit;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog database location
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// How weights are entered and doses shown
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub default_unit: WeightUnit,

    #[serde(default = "default_dose_decimals")]
    pub dose_decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_unit: WeightUnit::Kg,
            dose_decimals: default_dose_decimals(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vetdose")
        .join("vetdose.db")
}

fn default_dose_decimals() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the standard config path
    ///
    /// Nothing is logged here; callers install logging from the loaded
    /// config and report the source afterwards.
    pub fn load() -> ConfigResult<Self> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("vetdose").join("config.toml"))
    }

    /// The default config file, if one exists.
    pub fn locate() -> Option<PathBuf> {
        Self::default_config_path().filter(|path| path.exists())
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.default_unit, WeightUnit::Kg);
        assert_eq!(config.display.dose_decimals, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.database.path.ends_with("vetdose/vetdose.db"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.default_unit = WeightUnit::Lbs;
        config.database.path = dir.path().join("catalog.db");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[display]
default_unit = "lbs"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display.default_unit, WeightUnit::Lbs);
        assert_eq!(config.display.dose_decimals, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let result: Result<Config, _> = toml::from_str("[display]\ndefault_unit = \"stone\"\n");
        assert!(result.is_err());
    }
}
