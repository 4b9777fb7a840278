//! Decode anomaly and format error types
//!
//! Anomalies are absorbed by the decoders: they are reported alongside the
//! decoded samples and never abort a stream.

use thiserror::Error;

/// Something the decoder skipped over
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeAnomaly {
    /// Bytes that did not start a frame (skipped during resynchronization)
    #[error("{len} unexpected byte(s) at offset {offset}")]
    UnexpectedBytes { offset: usize, len: usize },

    /// Frame or record whose timestamp is not a representable instant
    #[error("timestamp out of range at offset {offset}")]
    InvalidTimestamp { offset: usize },

    /// Text record without exactly two tokens
    #[error("malformed record at offset {offset}: expected 2 tokens, got {tokens}")]
    MalformedRecord { offset: usize, tokens: usize },

    /// Text record token that is not a number
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },

    /// Text record that is not valid UTF-8
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Unterminated text longer than any record, dropped unparsed
    #[error("{len} byte(s) without line terminator at offset {offset}")]
    OversizedRecord { offset: usize, len: usize },
}

/// Unknown wire format name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format '{0}' (expected 'line' or 'binary')")]
pub struct FormatError(pub String);
