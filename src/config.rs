use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Engine-wide settings. Every field has a default so an empty YAML file (or
/// no file at all) yields a working configuration.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Digit prefix prepended to the owner id to derive the account number.
    pub account_number_prefix: String,
    pub history: HistoryConfig,
    pub logging: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            account_number_prefix: "989".to_string(),
            history: HistoryConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Limits for transaction-history queries.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Widest allowed date-range filter, in days.
    pub max_range_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            max_range_days: 90,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub log_level: String,
    /// When set, logs additionally go to rolling files under this directory.
    pub log_dir: Option<String>,
    pub log_file: String,
    pub use_json: bool,
    /// "hourly", "daily" or anything else for a single never-rotated file.
    pub rotation: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            log_file: "wallet-engine.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.account_number_prefix, "989");
        assert_eq!(config.history.default_page_size, 20);
        assert_eq!(config.history.max_page_size, 100);
        assert_eq!(config.history.max_range_days, 90);
        assert_eq!(config.logging.log_level, "info");
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "account_number_prefix: \"77\"\nhistory:\n  max_range_days: 30\n";
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.account_number_prefix, "77");
        assert_eq!(config.history.max_range_days, 30);
        // Untouched fields fall back to defaults.
        assert_eq!(config.history.default_page_size, 20);
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = EngineConfig::from_yaml_file("config/does-not-exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
