//! Query targets and tail URL construction
//!
//! A query names one or more resources on a datasource. Each target becomes
//! one `StreamSession` reading:
//!
//! ```text
//! GET <base-url>?name=<prefix><path>&rate=<rate>
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;

use tailfeed_protocol::Format;

use crate::error::{Result, TapError};

/// Datasource-level settings shared by every query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourceSettings {
    /// Base URL of the tail endpoint
    pub url: String,
    /// Prepended to every query path
    pub prefix: Option<String>,
}

impl DataSourceSettings {
    /// Create settings for a base URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prefix: None,
        }
    }

    /// Set path prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// One tail target
#[derive(Debug, Clone, PartialEq)]
pub struct TailQuery {
    /// Caller-chosen reference (e.g. "A")
    pub ref_id: String,
    /// Resource path on the datasource
    pub path: String,
    /// Expected seconds per sample (buffer sizing only)
    pub rate: Option<f64>,
    /// Reserved
    pub head: Option<String>,
    /// Wire format of the resource
    pub format: Format,
}

impl TailQuery {
    /// Create a query for a path
    pub fn new(ref_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            path: path.into(),
            rate: None,
            head: None,
            format: Format::default(),
        }
    }

    /// Set expected sample interval in seconds
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the reserved head parameter
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    /// Set wire format
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Human-readable label
    pub fn display_text(&self) -> String {
        format!("Tail: {}", self.path)
    }

    /// Session key for this target
    pub fn session_id(&self) -> String {
        format!("fetch-{}", self.ref_id)
    }

    /// Series name for this target
    pub fn series_name(&self) -> String {
        format!("Fetch {}", self.ref_id)
    }
}

/// Absolute time range of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Range of length `span` ending now
    pub fn ending_now(span: Duration) -> Self {
        let to = Utc::now();
        let span = chrono::Duration::from_std(span).unwrap_or(chrono::Duration::zero());
        Self { from: to - span, to }
    }

    /// Length of the range (zero if inverted)
    pub fn span(&self) -> Duration {
        (self.to - self.from).to_std().unwrap_or(Duration::ZERO)
    }
}

/// A set of targets to tail together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TailRequest {
    pub targets: Vec<TailQuery>,
    pub range: Option<TimeRange>,
}

impl TailRequest {
    /// Create a request for targets
    pub fn new(targets: Vec<TailQuery>) -> Self {
        Self {
            targets,
            range: None,
        }
    }

    /// Set time range
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Parse and check a datasource base URL
///
/// Fails without any network call when the URL is empty, unparsable or not
/// http(s).
pub fn parse_base_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TapError::InvalidUrl("URL is empty".into()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(TapError::InvalidUrl(format!(
            "'{url}' must start with http:// or https://"
        )));
    }
    Url::parse(url).map_err(|e| TapError::InvalidUrl(format!("'{url}': {e}")))
}

/// Build the streaming URL for one target
pub fn tail_url(settings: &DataSourceSettings, query: &TailQuery) -> Result<Url> {
    if query.path.trim().is_empty() {
        return Err(TapError::MissingPath {
            ref_id: query.ref_id.clone(),
        });
    }

    let mut url = parse_base_url(&settings.url)?;
    let name = format!("{}{}", settings.prefix.as_deref().unwrap_or(""), query.path);

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("name", &name);
        if let Some(rate) = query.rate {
            pairs.append_pair("rate", &rate.to_string());
        }
    }

    Ok(url)
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
