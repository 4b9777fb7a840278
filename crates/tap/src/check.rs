//! Datasource connectivity check
//!
//! Issues `GET <base-url>?TEST=YES`. Any response counts as reachable,
//! whatever its status; only a malformed URL or a transport failure is an
//! error. The check never touches decoders or buffers.

use tracing::debug;

use crate::error::{Result, TapError};
use crate::query::parse_base_url;
use crate::transport::Transport;

/// Result of a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    /// HTTP status the server answered with
    pub status: u16,
    /// Summary message
    pub message: String,
}

/// Check that the datasource answers at all
///
/// URL problems are reported before any network call is made.
pub async fn check_connectivity(transport: &dyn Transport, base_url: &str) -> Result<CheckStatus> {
    let mut url = parse_base_url(base_url)?;
    url.query_pairs_mut().append_pair("TEST", "YES");

    debug!(%url, "checking datasource");

    let opened = transport.open(&url).await.map_err(TapError::Unreachable)?;
    let status = opened.status;
    if let Some(body) = opened.body {
        body.abort();
    }

    debug!(status, "datasource answered");
    Ok(CheckStatus {
        status,
        message: "OK".into(),
    })
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
