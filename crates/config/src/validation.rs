//! Configuration validation
//!
//! Validates config consistency:
//! - Datasource URL is present and http(s)
//! - Buffer capacities are non-zero and ordered
//! - Connect timeout is non-zero

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_datasource(config)?;
    validate_session(config)?;
    Ok(())
}

fn validate_datasource(config: &Config) -> Result<()> {
    let url = config.datasource.url.trim();
    if url.is_empty() {
        return Err(ConfigError::missing_field("datasource", "url"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            "datasource",
            "url",
            "must start with http:// or https://",
        ));
    }
    Ok(())
}

fn validate_session(config: &Config) -> Result<()> {
    let session = &config.session;

    if session.default_capacity == 0 {
        return Err(ConfigError::invalid_value(
            "session",
            "default_capacity",
            "must be greater than 0",
        ));
    }
    if session.max_capacity == 0 {
        return Err(ConfigError::invalid_value(
            "session",
            "max_capacity",
            "must be greater than 0",
        ));
    }
    if session.default_capacity > session.max_capacity {
        return Err(ConfigError::invalid_value(
            "session",
            "default_capacity",
            format!("must not exceed max_capacity ({})", session.max_capacity),
        ));
    }
    if session.connect_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "session",
            "connect_timeout",
            "must be greater than 0",
        ));
    }

    Ok(())
}
