//! Binary framed point decoder
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────┬──────────────────────┬──────────────────────┐
//! │ 3 bytes  │ 8 bytes              │ 8 bytes              │
//! │ "snp"    │ timestamp ms (f64 BE)│ value (f64 BE)       │
//! └──────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! Frames are concatenated with no length prefix. Any byte that does not
//! start a marker is skipped one at a time until the next marker lines up.

use bytes::Buf;
use tracing::trace;

use crate::decoder::{Decoded, Decoder};
use crate::error::DecodeAnomaly;
use crate::sample::Sample;

/// In-band frame marker
pub const MAGIC: [u8; 3] = *b"snp";

/// Marker plus two f64 fields
pub const FRAME_LEN: usize = MAGIC.len() + 16;

/// Decoder for `snp` framed points
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteFrameDecoder;

impl ByteFrameDecoder {
    /// Create a new binary decoder
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ByteFrameDecoder {
    fn decode(&self, window: &[u8]) -> Decoded {
        let mut out = Decoded::default();
        let mut pos = 0;
        let mut skipped_from: Option<usize> = None;

        while pos < window.len() {
            let rest = &window[pos..];

            if rest.starts_with(&MAGIC) {
                flush_skipped(&mut out, &mut skipped_from, pos);

                // Partial frame: leave it for the next chunk
                if rest.len() < FRAME_LEN {
                    break;
                }

                let mut fields = &rest[MAGIC.len()..FRAME_LEN];
                let millis = fields.get_f64();
                let value = fields.get_f64();

                match Sample::from_millis(millis, value) {
                    Some(sample) => out.samples.push(sample),
                    None => out
                        .anomalies
                        .push(DecodeAnomaly::InvalidTimestamp { offset: pos }),
                }
                pos += FRAME_LEN;
            } else if rest.len() < MAGIC.len() && MAGIC.starts_with(rest) {
                // Marker split across chunks
                break;
            } else {
                skipped_from.get_or_insert(pos);
                pos += 1;
            }
        }

        flush_skipped(&mut out, &mut skipped_from, pos);
        out.consumed = pos;
        out
    }
}

/// Record a run of resynchronization bytes ending at `end`
fn flush_skipped(out: &mut Decoded, skipped_from: &mut Option<usize>, end: usize) {
    if let Some(offset) = skipped_from.take() {
        let len = end - offset;
        trace!(offset, len, "skipped unexpected bytes");
        out.anomalies
            .push(DecodeAnomaly::UnexpectedBytes { offset, len });
    }
}
