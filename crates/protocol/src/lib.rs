//! Tailfeed Protocol - decoders for tailed time-series streams
//!
//! This crate turns raw bytes pulled off a growing HTTP body into
//! `(timestamp, value)` samples:
//! - `Sample` - one decoded point (instant + f64 value)
//! - `DecodeCursor` - carry-over window that survives chunk boundaries
//! - `ByteFrameDecoder` - binary `snp` framed points with resynchronization
//! - `LineRecordDecoder` - newline-delimited `<timestamp> <value>` text
//!
//! # Design Principles
//!
//! - **Stateless decoders**: all carry-over lives in the `DecodeCursor`,
//!   decoders only report how many leading bytes they consumed
//! - **Non-fatal anomalies**: noise and malformed records are skipped and
//!   reported in `Decoded::anomalies`, never returned as errors
//! - **Caller selects the format**: no auto-detection

mod binary;
mod cursor;
mod decoder;
mod error;
mod line;
mod sample;

pub use binary::{ByteFrameDecoder, FRAME_LEN, MAGIC};
pub use cursor::DecodeCursor;
pub use decoder::{Decoded, Decoder, Format};
pub use error::{DecodeAnomaly, FormatError};
pub use line::{LineRecordDecoder, MAX_LINE_LEN};
pub use sample::Sample;

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

#[cfg(test)]
mod line_test;
