//! Line-oriented text decoder
//!
//! Each record is one `\n`-terminated line holding a timestamp in
//! milliseconds and a value, separated by whitespace:
//!
//! ```text
//! 1000 42.5
//! 1001 43.0
//! ```
//!
//! Only terminated lines are consumed. Splitting on the `\n` byte keeps
//! multi-byte UTF-8 sequences intact across chunk boundaries. An unterminated
//! tail longer than `MAX_LINE_LEN` is dropped and reported, so the retained
//! window stays bounded.

use tracing::trace;

use crate::decoder::{Decoded, Decoder};
use crate::error::DecodeAnomaly;
use crate::sample::Sample;

/// Longest unterminated tail kept waiting for its `\n` (4KB)
pub const MAX_LINE_LEN: usize = 4 * 1024;

/// Decoder for whitespace-delimited text records
#[derive(Debug, Clone, Copy, Default)]
pub struct LineRecordDecoder;

impl LineRecordDecoder {
    /// Create a new line decoder
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for LineRecordDecoder {
    fn decode(&self, window: &[u8]) -> Decoded {
        let mut out = Decoded::default();

        if let Some(last_newline) = window.iter().rposition(|&b| b == b'\n') {
            let mut offset = 0;
            for line in window[..last_newline].split(|&b| b == b'\n') {
                match parse_record(line, offset) {
                    Ok(Some(sample)) => out.samples.push(sample),
                    Ok(None) => {}
                    Err(anomaly) => {
                        trace!(%anomaly, "skipped text record");
                        out.anomalies.push(anomaly);
                    }
                }
                offset += line.len() + 1;
            }
            out.consumed = last_newline + 1;
        }

        let terminated = out.consumed;

        let tail = window.len() - terminated;
        if tail > MAX_LINE_LEN {
            let anomaly = DecodeAnomaly::OversizedRecord {
                offset: terminated,
                len: tail,
            };
            trace!(%anomaly, "dropped unterminated text");
            out.anomalies.push(anomaly);
            out.consumed = window.len();
        }

        out
    }
}

/// Parse one line; blank lines yield `Ok(None)`
fn parse_record(line: &[u8], offset: usize) -> Result<Option<Sample>, DecodeAnomaly> {
    let text = std::str::from_utf8(line).map_err(|_| DecodeAnomaly::InvalidUtf8 { offset })?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [millis, value] = tokens.as_slice() else {
        return Err(DecodeAnomaly::MalformedRecord {
            offset,
            tokens: tokens.len(),
        });
    };

    let millis: f64 = millis
        .parse()
        .map_err(|_| DecodeAnomaly::InvalidNumber { offset })?;
    let value: f64 = value
        .parse()
        .map_err(|_| DecodeAnomaly::InvalidNumber { offset })?;

    Sample::from_millis(millis, value)
        .map(Some)
        .ok_or(DecodeAnomaly::InvalidTimestamp { offset })
}
