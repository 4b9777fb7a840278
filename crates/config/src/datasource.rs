//! Datasource configuration
//!
//! The tail endpoint every query is issued against.

use serde::Deserialize;

/// Datasource configuration
///
/// # Example
///
/// ```toml
/// [datasource]
/// url = "http://localhost:8080/tail"
/// prefix = "/var/log/"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Base URL of the tail endpoint
    /// Default: "http://localhost:8080/tail"
    pub url: String,

    /// Prepended to every query path
    /// Default: none
    pub prefix: Option<String>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/tail".to_string(),
            prefix: None,
        }
    }
}
