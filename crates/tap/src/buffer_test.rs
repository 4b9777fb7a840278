//! Tests for the series ring buffer

use std::time::Duration;

use chrono::TimeZone;

use super::*;

/// Helper to create a sample at `secs` seconds past the epoch
fn sample(secs: i64, value: f64) -> Sample {
    Sample::new(Utc.timestamp_opt(secs, 0).unwrap(), value)
}

fn range_of(secs: u64) -> TimeRange {
    let to = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    TimeRange::new(to - chrono::Duration::seconds(secs as i64), to)
}

// ============================================================================
// Basic operations
// ============================================================================

#[test]
fn test_new_buffer_is_empty() {
    let buffer = CircularSeriesBuffer::new();
    assert!(buffer.is_empty());
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
    assert!(buffer.latest().is_none());
    assert!(buffer.snapshot().is_empty());
}

#[test]
fn test_zero_capacity_is_raised_to_one() {
    let mut buffer = CircularSeriesBuffer::with_capacity(0);
    assert_eq!(buffer.capacity(), 1);

    buffer.push(sample(1, 1.0));
    buffer.push(sample(2, 2.0));
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.latest(), Some(sample(2, 2.0)));
}

#[test]
fn test_push_below_capacity_keeps_order() {
    let mut buffer = CircularSeriesBuffer::with_capacity(5);
    for i in 0..3 {
        buffer.push(sample(i, i as f64));
    }

    let snap = buffer.snapshot();
    assert_eq!(snap.len(), 3);
    assert_eq!(snap.values, vec![0.0, 1.0, 2.0]);
    assert_eq!(buffer.total_pushed(), 3);
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_overflow_keeps_last_capacity_samples_oldest_first() {
    let capacity = 4;
    let extra = 7;
    let mut buffer = CircularSeriesBuffer::with_capacity(capacity);

    for i in 0..(capacity + extra) as i64 {
        buffer.push(sample(i, i as f64 * 10.0));
    }

    let snap = buffer.snapshot();
    assert_eq!(snap.len(), capacity);
    assert_eq!(snap.values, vec![70.0, 80.0, 90.0, 100.0]);
    assert_eq!(
        snap.times,
        (7..11)
            .map(|s| Utc.timestamp_opt(s, 0).unwrap())
            .collect::<Vec<_>>()
    );
    assert_eq!(buffer.total_pushed(), (capacity + extra) as u64);
}

#[test]
fn test_latest_tracks_wraparound() {
    let mut buffer = CircularSeriesBuffer::with_capacity(3);
    for i in 0..5 {
        buffer.push(sample(i, i as f64));
        assert_eq!(buffer.latest(), Some(sample(i, i as f64)));
    }
}

#[test]
fn test_snapshot_is_isolated_from_later_pushes() {
    let mut buffer = CircularSeriesBuffer::with_capacity(2);
    buffer.push(sample(1, 1.0));
    buffer.push(sample(2, 2.0));

    let before = buffer.snapshot();
    buffer.push(sample(3, 3.0));

    assert_eq!(before.values, vec![1.0, 2.0]);
    assert_eq!(buffer.snapshot().values, vec![2.0, 3.0]);
}

#[test]
fn test_snapshot_samples_and_last() {
    let mut buffer = CircularSeriesBuffer::with_capacity(3);
    buffer.push(sample(1, 1.5));
    buffer.push(sample(2, 2.5));

    let snap = buffer.snapshot();
    assert_eq!(snap.capacity, 3);
    let samples: Vec<_> = snap.samples().collect();
    assert_eq!(samples, vec![sample(1, 1.5), sample(2, 2.5)]);
    assert_eq!(snap.last(), Some(sample(2, 2.5)));
}

#[test]
fn test_empty_snapshot() {
    let snap = SeriesSnapshot::empty(10);
    assert!(snap.is_empty());
    assert_eq!(snap.capacity, 10);
    assert!(snap.last().is_none());
}

// ============================================================================
// Capacity policy
// ============================================================================

#[test]
fn test_capacity_defaults_without_rate_or_range() {
    let policy = CapacityPolicy::default();
    let range = range_of(3600);

    assert_eq!(policy.capacity_for(None, None), DEFAULT_CAPACITY);
    assert_eq!(policy.capacity_for(Some(&range), None), DEFAULT_CAPACITY);
    assert_eq!(policy.capacity_for(None, Some(1.0)), DEFAULT_CAPACITY);
}

#[test]
fn test_capacity_from_range_and_rate() {
    let policy = CapacityPolicy::default();

    assert_eq!(policy.capacity_for(Some(&range_of(3600)), Some(1.0)), 3600);
    assert_eq!(policy.capacity_for(Some(&range_of(60)), Some(7.0)), 9);
    assert_eq!(policy.capacity_for(Some(&range_of(10)), Some(60.0)), 1);
}

#[test]
fn test_capacity_ignores_bad_rates() {
    let policy = CapacityPolicy::default();
    let range = range_of(3600);

    for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert_eq!(policy.capacity_for(Some(&range), Some(rate)), DEFAULT_CAPACITY);
    }
}

#[test]
fn test_capacity_is_clamped_to_max() {
    let policy = CapacityPolicy {
        default_capacity: 50,
        max_capacity: 500,
    };

    assert_eq!(policy.capacity_for(Some(&range_of(86_400)), Some(1.0)), 500);
    assert_eq!(policy.capacity_for(None, None), 50);

    let tight = CapacityPolicy {
        default_capacity: 5_000,
        max_capacity: 100,
    };
    assert_eq!(tight.capacity_for(None, None), 100);
}

#[test]
fn test_empty_range_uses_default() {
    let policy = CapacityPolicy::default();
    let now = Utc::now();
    let range = TimeRange::new(now, now);
    assert_eq!(range.span(), Duration::ZERO);
    assert_eq!(policy.capacity_for(Some(&range), Some(1.0)), DEFAULT_CAPACITY);
}
