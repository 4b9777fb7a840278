//! Tailfeed Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Every section is optional; an empty file tails `http://localhost:8080/tail`
//! with line-format decoding.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use tailfeed_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[datasource]\nurl = \"http://host/tail\"").unwrap();
//! assert_eq!(config.datasource.url, "http://host/tail");
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [datasource]
//! url = "http://localhost:8080/tail"
//! prefix = "/var/log/"
//!
//! [session]
//! format = "line"
//! default_capacity = 1000
//! max_capacity = 100000
//! stall_timeout = "30s"
//!
//! [log]
//! level = "info"
//! format = "console"
//! ```

mod datasource;
mod error;
mod logging;
mod session;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use datasource::DataSourceConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use session::SessionConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to tail from
    pub datasource: DataSourceConfig,

    /// Session defaults (format, buffer sizing, stall detection)
    pub session: SessionConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Load from an optional path, falling back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tailfeed_protocol::Format;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.datasource.url, "http://localhost:8080/tail");
        assert!(config.datasource.prefix.is_none());
        assert_eq!(config.session.format, Format::Line);
        assert_eq!(config.session.default_capacity, 1000);
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[datasource]
url = "https://feeds.example.com/tail"
prefix = "/var/log/"

[session]
format = "binary"
default_capacity = 500
max_capacity = 5000
stall_timeout = "1m"
connect_timeout = "3s"

[log]
level = "debug"
format = "json"
output = "stdout"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.datasource.url, "https://feeds.example.com/tail");
        assert_eq!(config.datasource.prefix.as_deref(), Some("/var/log/"));
        assert_eq!(config.session.format, Format::Binary);
        assert_eq!(config.session.default_capacity, 500);
        assert_eq!(config.session.max_capacity, 5000);
        assert_eq!(config.session.stall_timeout, Duration::from_secs(60));
        assert_eq!(config.session.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.output, LogOutput::Stdout);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result = Config::from_str("[session]\nformat = \"csv\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.session.max_capacity, 100_000);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/tailfeed.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("/nonexistent/tailfeed.toml"));
    }
}
