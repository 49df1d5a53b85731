//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/wikichron/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/wikichron/` (~/.config/wikichron/)
//! - State/Logs: `$XDG_STATE_HOME/wikichron/` (~/.local/state/wikichron/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How revision dumps are read
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Format of the revision dump files.
///
/// The defaults match the WikiChron CSV exports: `;` separated, `|` quoted,
/// timestamps in UTC with a trailing `Z`.
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Field delimiter (single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Quote character (single ASCII character)
    #[serde(default = "default_quote")]
    pub quote: char,

    /// `chrono` format string for the `timestamp` column
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            quote: default_quote(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl DatasetConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(
                "dataset.delimiter must be a single ASCII character".to_string(),
            ));
        }
        if !self.quote.is_ascii() {
            return Err(Error::Config(
                "dataset.quote must be a single ASCII character".to_string(),
            ));
        }
        if self.delimiter == self.quote {
            return Err(Error::Config(
                "dataset.delimiter and dataset.quote must differ".to_string(),
            ));
        }
        if self.timestamp_format.trim().is_empty() {
            return Err(Error::Config(
                "dataset.timestamp_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_delimiter() -> char {
    ';'
}

fn default_quote() -> char {
    '|'
}

fn default_timestamp_format() -> String {
    "%Y-%m-%dT%H:%M:%SZ".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.dataset.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/wikichron/config.toml` (~/.config/wikichron/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("wikichron").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/wikichron/` (~/.local/state/wikichron/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("wikichron")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset.delimiter, ';');
        assert_eq!(config.dataset.quote, '|');
        assert_eq!(config.dataset.timestamp_format, "%Y-%m-%dT%H:%M:%SZ");
        assert_eq!(config.logging.level, "info");
        assert!(config.dataset.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[dataset]
delimiter = ","
quote = '"'

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.dataset.delimiter, ',');
        assert_eq!(config.dataset.quote, '"');
        assert_eq!(config.dataset.timestamp_format, "%Y-%m-%dT%H:%M:%SZ");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_dataset_config_validation() {
        let config = DatasetConfig {
            delimiter: '|',
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DatasetConfig {
            delimiter: '§',
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DatasetConfig {
            timestamp_format: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dataset]\ndelimiter = \"\\t\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.dataset.delimiter, '\t');

        std::fs::write(&path, "[dataset]\ndelimiter = \"|\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
