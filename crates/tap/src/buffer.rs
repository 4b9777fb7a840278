//! Ring buffer for the tailed series
//!
//! The `CircularSeriesBuffer` stores the last N samples of one session in a
//! fixed-size ring. When full, each push overwrites the oldest sample (strict
//! FIFO), so stored samples are never moved or reallocated.
//!
//! Snapshots are owned copies in oldest-first order and are safe to hand to
//! observers while the session keeps pushing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tailfeed_protocol::Sample;

use crate::query::TimeRange;

/// Default capacity when no rate information is available
pub const DEFAULT_CAPACITY: usize = 1000;

/// Maximum capacity to prevent memory issues
pub const MAX_CAPACITY: usize = 100_000;

/// Fixed-capacity FIFO store of `(timestamp, value)` samples
#[derive(Debug, Clone)]
pub struct CircularSeriesBuffer {
    /// Timestamp column
    times: Vec<DateTime<Utc>>,
    /// Value column, parallel to `times`
    values: Vec<f64>,
    /// Slot the next push writes once the ring is full (the oldest sample)
    write_pos: usize,
    /// Total samples ever pushed
    total_pushed: u64,
    /// Capacity
    capacity: usize,
}

impl CircularSeriesBuffer {
    /// Create a buffer with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer with specified capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            write_pos: 0,
            total_pushed: 0,
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: Sample) {
        if self.times.len() < self.capacity {
            self.times.push(sample.timestamp);
            self.values.push(sample.value);
        } else {
            let pos = self.write_pos;
            self.times[pos] = sample.timestamp;
            self.values[pos] = sample.value;
            self.write_pos = (pos + 1) % self.capacity;
        }
        self.total_pushed += 1;
    }

    /// Point-in-time copy, oldest first
    pub fn snapshot(&self) -> SeriesSnapshot {
        let (head, tail) = (self.write_pos, self.times.len());

        let mut times = Vec::with_capacity(tail);
        times.extend_from_slice(&self.times[head..]);
        times.extend_from_slice(&self.times[..head]);

        let mut values = Vec::with_capacity(tail);
        values.extend_from_slice(&self.values[head..]);
        values.extend_from_slice(&self.values[..head]);

        SeriesSnapshot {
            capacity: self.capacity,
            times,
            values,
        }
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<Sample> {
        if self.times.is_empty() {
            return None;
        }
        let idx = (self.write_pos + self.times.len() - 1) % self.times.len();
        Some(Sample::new(self.times[idx], self.values[idx]))
    }

    /// Get the total number of samples pushed
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Get the current fill level
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Get capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CircularSeriesBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of a series buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    /// Capacity of the buffer this was taken from
    pub capacity: usize,
    /// Timestamps, oldest first
    pub times: Vec<DateTime<Utc>>,
    /// Values, parallel to `times`
    pub values: Vec<f64>,
}

impl SeriesSnapshot {
    /// Snapshot of an empty buffer
    pub fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Check if the snapshot holds no samples
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterate samples oldest first
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(t, v)| Sample::new(*t, *v))
    }

    /// Newest sample
    pub fn last(&self) -> Option<Sample> {
        self.samples().last()
    }
}

/// Sizing rules for session buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Used when rate or range is unknown
    pub default_capacity: usize,
    /// Upper bound for computed capacities
    pub max_capacity: usize,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            max_capacity: MAX_CAPACITY,
        }
    }
}

impl CapacityPolicy {
    /// Capacity for a range sampled every `rate_secs` seconds
    ///
    /// `ceil(range / rate)`, falling back to the default when the rate is
    /// missing, zero, negative or not finite, or when there is no range.
    pub fn capacity_for(&self, range: Option<&TimeRange>, rate_secs: Option<f64>) -> usize {
        let max = self.max_capacity.max(1);
        let fallback = self.default_capacity.clamp(1, max);

        let (Some(range), Some(rate)) = (range, rate_secs) else {
            return fallback;
        };
        if !rate.is_finite() || rate <= 0.0 {
            return fallback;
        }

        let span = range.span();
        if span.is_zero() {
            return fallback;
        }

        let points = (span.as_secs_f64() / rate).ceil();
        if points >= max as f64 {
            max
        } else {
            (points as usize).max(1)
        }
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod tests;
