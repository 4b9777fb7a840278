//! Logging configuration
//!
//! Tailed data goes to stdout, so logs default to stderr. The configured
//! level applies to tailfeed's own crates; dependencies (hyper, reqwest,
//! rustls) stay at `warn` unless the level is stricter.

use serde::Deserialize;

/// Crates that follow the configured level
const OWN_TARGETS: &[&str] = &[
    "tailfeed",
    "tailfeed_tap",
    "tailfeed_protocol",
    "tailfeed_config",
];

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-chunk decode details
    Trace,
    /// Session transitions and skipped input
    Debug,
    /// Session start and finish (default)
    #[default]
    Info,
    /// Failed and stalled sessions
    Warn,
    Error,
}

impl LogLevel {
    /// Level name as understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `EnvFilter` directive scoping this level to tailfeed's crates
    pub fn filter_directive(&self) -> String {
        let base = match self {
            Self::Error => "error",
            _ => "warn",
        };
        let mut directive = base.to_string();
        for target in OWN_TARGETS {
            directive.push(',');
            directive.push_str(target);
            directive.push('=');
            directive.push_str(self.as_str());
        }
        directive
    }
}

/// Log line encoding
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text, colored on a terminal (default)
    #[default]
    Console,
    /// One JSON object per event
    Json,
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    /// Default, keeps stdout free for tail output
    #[default]
    Stderr,
}

/// `[log]` section
///
/// # Example
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "stderr"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
}
