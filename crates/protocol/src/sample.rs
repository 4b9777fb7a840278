//! Decoded time/value point

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Microseconds per millisecond
const MICROS_PER_MILLI: f64 = 1000.0;

/// One decoded point of the series
///
/// Immutable once decoded. Values are carried through untouched, including
/// NaN and infinities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Instant of the point
    pub timestamp: DateTime<Utc>,
    /// Raw value
    pub value: f64,
}

impl Sample {
    /// Create a sample from an instant and a value
    #[inline]
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Create a sample from milliseconds since the Unix epoch
    ///
    /// Fractional milliseconds are kept at microsecond precision. Returns
    /// `None` when the timestamp is NaN, infinite or outside chrono's range.
    pub fn from_millis(millis: f64, value: f64) -> Option<Self> {
        let micros = millis * MICROS_PER_MILLI;
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return None;
        }
        let timestamp = DateTime::from_timestamp_micros(micros.round() as i64)?;
        Some(Self { timestamp, value })
    }

    /// Timestamp as milliseconds since the Unix epoch
    #[inline]
    pub fn timestamp_millis(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / MICROS_PER_MILLI
    }
}
