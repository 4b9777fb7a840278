//! Session configuration
//!
//! Defaults applied to every tail session started from the CLI.
//!
//! # Defaults
//!
//! - `format`: line
//! - `default_capacity`: 1000 points
//! - `max_capacity`: 100000 points
//! - `stall_timeout`: 30s (0 disables stall warnings)
//! - `connect_timeout`: 10s

use serde::Deserialize;
use std::time::Duration;

use tailfeed_protocol::Format;

/// Session configuration
///
/// # Example
///
/// ```toml
/// [session]
/// format = "binary"
/// default_capacity = 1000
/// max_capacity = 100000
/// stall_timeout = "30s"
/// connect_timeout = "10s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wire format of tailed resources (line, binary)
    pub format: Format,

    /// Buffer capacity when no rate or range is known
    pub default_capacity: usize,

    /// Upper bound for computed buffer capacities
    pub max_capacity: usize,

    /// Warn when a streaming session receives nothing for this long
    #[serde(with = "humantime_serde")]
    pub stall_timeout: Duration,

    /// HTTP connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: Format::Line,
            default_capacity: 1000,
            max_capacity: 100_000,
            stall_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Stall timeout, `None` when disabled
    pub fn stall_timeout(&self) -> Option<Duration> {
        (!self.stall_timeout.is_zero()).then_some(self.stall_timeout)
    }
}
