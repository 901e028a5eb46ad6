//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/pypistats/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/pypistats/` (~/.config/pypistats/)
//! - State/Logs: `$XDG_STATE_HOME/pypistats/` (~/.local/state/pypistats/)
//!
//! The warehouse service-account key is deliberately NOT part of the
//! config file; it comes from the `SERVICE_ACCOUNT_JSON` environment
//! variable and is only required when a live fetch is attempted.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable holding the warehouse service-account key blob.
pub const SERVICE_ACCOUNT_ENV: &str = "SERVICE_ACCOUNT_JSON";

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
    /// Query defaults, overridable per invocation
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default query parameters
#[derive(Debug, Deserialize)]
pub struct QueryConfig {
    /// Field names used when the caller requests none
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Day window; 0 means all time
    #[serde(default)]
    pub days: u32,

    /// Query timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Cap on result groups; no cap when absent
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            days: 0,
            timeout_ms: default_timeout_ms(),
            limit: None,
        }
    }
}

fn default_fields() -> Vec<String> {
    [
        "date",
        "country",
        "version",
        "installer",
        "system",
        "distro",
        "cpu",
        "system-release",
        "pyversion",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_timeout_ms() -> u64 {
    120_000
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/pypistats/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("pypistats").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/pypistats/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("pypistats")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("pypistats.log")
    }
}

/// Read the warehouse service-account key from the environment.
pub fn service_account_json() -> Result<String> {
    std::env::var(SERVICE_ACCOUNT_ENV).map_err(|_| {
        Error::Config(format!(
            "{SERVICE_ACCOUNT_ENV} is not set; export the warehouse service-account key to query live data"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.query.days, 0);
        assert_eq!(config.query.timeout_ms, 120_000);
        assert_eq!(config.query.limit, None);
        assert_eq!(config.query.fields.len(), 9);
        assert_eq!(config.query.fields[0], "date");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[query]
fields = ["date", "country"]
days = 30
timeout_ms = 60000
limit = 500

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.query.fields, vec!["date", "country"]);
        assert_eq!(config.query.days, 30);
        assert_eq!(config.query.timeout_ms, 60_000);
        assert_eq!(config.query.limit, Some(500));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml = r#"
[query]
days = 7
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.query.days, 7);
        assert_eq!(config.query.timeout_ms, 120_000);
        assert_eq!(config.query.fields.len(), 9);
    }

    #[test]
    fn test_config_path() {
        assert!(Config::config_path().ends_with("pypistats/config.toml"));
        assert!(Config::log_path().ends_with("pypistats/pypistats.log"));
    }
}
