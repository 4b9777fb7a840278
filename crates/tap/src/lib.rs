//! Tailfeed Tap - live tail sessions over streaming HTTP bodies
//!
//! This crate provides the streaming ingestion engine. It:
//!
//! - Opens a long-lived GET per query target and reads it chunk by chunk
//! - Decodes each chunk (binary frames or text lines) while the transfer runs
//! - Keeps the last N points in a fixed-capacity ring per session
//! - Publishes a state snapshot after every chunk to observers
//! - Cancels cleanly: aborts the transfer, stops reading and publishing
//!
//! # Architecture
//!
//! ```text
//! SessionRegistry.query()
//!     │
//!     ├──→ StreamSession (one per target)
//!     │         │
//!     │    Transport.open() ──→ ChunkStream.next_chunk()
//!     │                              │
//!     │                              ▼
//!     │                   DecodeCursor + Decoder
//!     │                              │
//!     │                              ▼
//!     │                   CircularSeriesBuffer
//!     │                              │
//!     │                              ▼
//!     └──→──────────────── SessionState ──→ merged channel ──→ observer
//! ```

pub mod buffer;
pub mod check;
mod error;
pub mod query;
pub mod registry;
pub mod session;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use buffer::{CapacityPolicy, CircularSeriesBuffer, SeriesSnapshot};
pub use check::{CheckStatus, check_connectivity};
pub use error::{Result, TapError, TransportError};
pub use query::{DataSourceSettings, TailQuery, TailRequest, TimeRange, parse_base_url, tail_url};
pub use registry::SessionRegistry;
pub use session::{
    ActivityStats, SessionHandle, SessionOutcome, SessionTask, StateReceiver, StateSender,
    StreamSession,
};
pub use state::{ErrorInfo, Phase, SessionState};
pub use transport::{ChunkStream, HttpTransport, Opened, Transport};
