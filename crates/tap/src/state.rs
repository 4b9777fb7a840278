//! Published session state
//!
//! `SessionState` values are what observers receive: owned, read-only copies
//! taken by the session after each transition or chunk.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::buffer::SeriesSnapshot;
use crate::error::TransportError;

/// Lifecycle phase of a session
///
/// ```text
/// Loading ──→ Streaming ──→ Done
///    │            │
///    ├──→ Error ←─┤
///    │            │
///    └─→ Cancelled ←┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Request issued, waiting for the response head
    Loading,
    /// Body is being read
    Streaming,
    /// End of stream reached
    Done,
    /// Transport failure
    Error,
    /// Cancelled by the caller (never published)
    Cancelled,
}

impl Phase {
    /// Check if no further transitions are possible
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }

    /// Phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Error details attached to an `Error` state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Human-readable message
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// HTTP reason phrase
    pub status_text: String,
    /// Query reference the session belongs to
    pub ref_id: String,
}

impl ErrorInfo {
    /// Build from a transport failure
    pub fn from_transport(err: &TransportError, ref_id: &str) -> Self {
        match err {
            TransportError::Status {
                status,
                status_text,
            } => Self {
                message: format!("error loading url: HTTP {status} {status_text}"),
                status: Some(*status),
                status_text: status_text.clone(),
                ref_id: ref_id.to_string(),
            },
            other => Self {
                message: other.to_string(),
                status: None,
                status_text: String::new(),
                ref_id: ref_id.to_string(),
            },
        }
    }
}

/// Snapshot of one session, as published to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Session key (`fetch-<refId>`)
    pub id: String,
    /// Series name (`Fetch <refId>`)
    pub name: String,
    /// Current phase
    pub phase: Phase,
    /// Set in the `Error` phase
    pub error: Option<ErrorInfo>,
    /// Buffered series once the body is readable
    pub series: Option<SeriesSnapshot>,
    /// Chunks received so far
    pub chunk_count: u64,
    /// Arrival time of the last chunk
    pub last_activity: Option<DateTime<Utc>>,
}
