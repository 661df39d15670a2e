//! Configuration management for txfeed
//!
//! This module handles loading, validation, and management of
//! txfeed configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::{ConfigError, ConfigResult};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

// ==================== Configuration Types ====================

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON fixture holding employees and transactions
    #[serde(default = "default_fixture")]
    pub fixture: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            fixture: default_fixture(),
        }
    }
}

fn default_fixture() -> PathBuf {
    PathBuf::from("./data/fixture.json")
}

/// Mock data source behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Transactions per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Simulated latency of every request, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            latency_ms: 0,
        }
    }
}

fn default_page_size() -> usize {
    5
}

impl MockConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: off, error, warn, info, debug, trace
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data file settings
    #[serde(default)]
    pub data: DataConfig,
    /// Mock data source settings
    #[serde(default)]
    pub mock: MockConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.mock.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mock.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.mock.latency_ms > 10_000 {
            return Err(ConfigError::InvalidValue {
                field: "mock.latency_ms".to_string(),
                reason: "Latency must be at most 10000 ms".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Fixture path, resolved against `base` when relative
    pub fn fixture_path(&self, base: &Path) -> PathBuf {
        if self.data.fixture.is_absolute() {
            self.data.fixture.clone()
        } else {
            base.join(&self.data.fixture)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.mock.page_size, 5);
        assert_eq!(config.mock.latency(), Duration::ZERO);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.data.fixture, PathBuf::from("./data/fixture.json"));
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.mock.page_size, default_page_size());
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml("mock:\n  latency_ms: 250\nlogging:\n  level: DEBUG\n").unwrap();
        assert_eq!(config.mock.page_size, 5);
        assert_eq!(config.mock.latency(), Duration::from_millis(250));
    }

    #[test]
    fn test_validation_errors() {
        let error = Config::from_yaml("mock:\n  page_size: 0\n").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { ref field, .. } if field == "mock.page_size"));

        let error = Config::from_yaml("mock:\n  latency_ms: 20000\n").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { ref field, .. } if field == "mock.latency_ms"));

        let error = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { ref field, .. } if field == "logging.level"));

        let error = Config::from_yaml("mock: [1, 2").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let error = Config::load("/definitely/not/here/config.yaml").unwrap_err();
        assert!(matches!(error, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_fixture_path_resolution() {
        let config = Config::default();
        assert_eq!(
            config.fixture_path(Path::new("/srv/feed")),
            PathBuf::from("/srv/feed/./data/fixture.json")
        );
    }
}
