//! Carry-over window for split records
//!
//! A record may straddle two network reads. The cursor keeps every byte the
//! decoder has not consumed yet and appends the next chunk behind it, so the
//! decoder always sees one contiguous window.

use bytes::{Buf, BytesMut};

use crate::decoder::{Decoded, Decoder};

/// Initial window capacity (64KB)
const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Accumulated bytes plus the position the decoder has reached
#[derive(Debug)]
pub struct DecodeCursor {
    /// Accumulated bytes; `buffer[..position]` is already consumed
    buffer: BytesMut,
    /// Start of the unconsumed window
    position: usize,
}

impl DecodeCursor {
    /// Create an empty cursor
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty cursor with the given initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            position: 0,
        }
    }

    /// Append a newly received chunk
    ///
    /// The consumed prefix is released first so the buffer only ever holds
    /// the pending tail plus the new chunk.
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.position > 0 {
            self.buffer.advance(self.position);
            self.position = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.buffer[self.position..]
    }

    /// Mark `n` leading bytes of the window as consumed
    pub fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.buffer.len());
    }

    /// Run `decoder` over the window and advance past what it consumed
    pub fn decode_with(&mut self, decoder: &dyn Decoder) -> Decoded {
        let decoded = decoder.decode(self.window());
        self.advance(decoded.consumed);
        decoded
    }

    /// Number of bytes waiting for more input
    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Check if nothing is pending
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for DecodeCursor {
    fn default() -> Self {
        Self::new()
    }
}
