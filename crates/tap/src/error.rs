//! Error types for the tap crate

use thiserror::Error;

/// Transport-level failures
///
/// These are the only failures that end a session in the `Error` phase.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a non-success status
    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },

    /// Response carried no readable body
    #[error("missing response body")]
    MissingBody,

    /// HTTP client error (connect, reset, decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Other network failure
    #[error("network error: {0}")]
    Network(String),
}

/// Errors that can occur in the tap system
#[derive(Error, Debug)]
pub enum TapError {
    /// Base URL is empty, malformed or not http(s)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Query target without a resource path
    #[error("query {ref_id} has no path")]
    MissingPath { ref_id: String },

    /// A session with this ID is already running
    #[error("session already running: {id}")]
    DuplicateSession { id: String },

    /// Session not found
    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    /// Connectivity check got no response
    #[error("datasource unreachable: {0}")]
    Unreachable(#[source] TransportError),

    /// Session task panicked or was aborted
    #[error("session task failed: {0}")]
    TaskFailed(String),
}

/// Result type for tap operations
pub type Result<T> = std::result::Result<T, TapError>;
