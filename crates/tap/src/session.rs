//! StreamSession - one end-to-end tail operation
//!
//! A session opens the tail URL, pulls the body one chunk at a time, feeds
//! each chunk through the selected decoder into its `CircularSeriesBuffer`
//! and publishes a `SessionState` after every chunk.
//!
//! # Ordering
//!
//! Only one read is ever outstanding. Decoding and buffer mutation happen
//! synchronously between reads, so chunk N's state is always published
//! before chunk N+1 is requested.
//!
//! # Cancellation
//!
//! `SessionHandle::cancel` first closes the publish gate, then fires the
//! cancellation token. The in-flight request or read is dropped and the body
//! is aborted once. Nothing is published after `cancel` returns.
//!
//! # Usage
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let task = StreamSession::new(&query, url, 1000, transport, tx).spawn();
//!
//! while let Some(state) = rx.recv().await {
//!     // render state.series
//! }
//! let outcome = task.wait().await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use tailfeed_protocol::{DecodeCursor, Decoder};

use crate::buffer::CircularSeriesBuffer;
use crate::error::{Result, TapError, TransportError};
use crate::query::TailQuery;
use crate::state::{ErrorInfo, Phase, SessionState};
use crate::transport::{ChunkStream, Opened, Transport};

/// Sender side of a state channel
pub type StateSender = mpsc::UnboundedSender<SessionState>;

/// Receiver side of a state channel
pub type StateReceiver = mpsc::UnboundedReceiver<SessionState>;

/// Marker for "no chunk received yet"
const NO_ACTIVITY: i64 = i64::MIN;

/// Live counters shared between a session and its handles
#[derive(Debug)]
struct SessionActivity {
    chunk_count: AtomicU64,
    sample_count: AtomicU64,
    anomaly_count: AtomicU64,
    /// Millis since epoch of the last chunk
    last_activity_ms: AtomicI64,
}

impl SessionActivity {
    fn new() -> Self {
        Self {
            chunk_count: AtomicU64::new(0),
            sample_count: AtomicU64::new(0),
            anomaly_count: AtomicU64::new(0),
            last_activity_ms: AtomicI64::new(NO_ACTIVITY),
        }
    }

    /// Returns the new chunk count
    fn record_chunk(&self, at: DateTime<Utc>) -> u64 {
        self.last_activity_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
        self.chunk_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn record_decoded(&self, samples: usize, anomalies: usize) {
        self.sample_count
            .fetch_add(samples as u64, Ordering::Relaxed);
        self.anomaly_count
            .fetch_add(anomalies as u64, Ordering::Relaxed);
    }

    fn stats(&self) -> ActivityStats {
        let last = self.last_activity_ms.load(Ordering::Relaxed);
        ActivityStats {
            chunk_count: self.chunk_count.load(Ordering::Relaxed),
            sample_count: self.sample_count.load(Ordering::Relaxed),
            anomaly_count: self.anomaly_count.load(Ordering::Relaxed),
            last_activity: if last == NO_ACTIVITY {
                None
            } else {
                DateTime::from_timestamp_millis(last)
            },
        }
    }
}

/// Activity counters of a session, for stall detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    /// Chunks received
    pub chunk_count: u64,
    /// Samples decoded
    pub sample_count: u64,
    /// Bytes/records skipped by the decoder
    pub anomaly_count: u64,
    /// Arrival time of the last chunk
    pub last_activity: Option<DateTime<Utc>>,
}

impl ActivityStats {
    /// Time since the last chunk, `None` before the first one
    pub fn idle_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_activity
            .map(|last| (now - last).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Serializes publications against cancellation
///
/// Closing drops the sender, so the state channel ends once every session
/// feeding it has been cancelled or has terminated.
#[derive(Debug)]
struct PublishGate {
    tx: Mutex<Option<StateSender>>,
}

impl PublishGate {
    fn new(tx: StateSender) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Returns false if the gate is closed or the observer is gone
    fn publish(&self, build: impl FnOnce() -> SessionState) -> bool {
        let tx = self.tx.lock();
        tx.as_ref().is_some_and(|tx| tx.send(build()).is_ok())
    }

    /// Returns true if this call closed the gate
    fn close(&self) -> bool {
        self.tx.lock().take().is_some()
    }
}

/// Cloneable control handle for a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: String,
    cancel: CancellationToken,
    gate: Arc<PublishGate>,
    activity: Arc<SessionActivity>,
}

impl SessionHandle {
    /// Get the session ID
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cancel the session
    ///
    /// Safe to call from any task or thread, any number of times.
    pub fn cancel(&self) {
        if self.gate.close() {
            debug!(id = %self.id, "cancelling session");
        }
        self.cancel.cancel();
    }

    /// Check if cancellation was requested
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current activity counters
    pub fn activity(&self) -> ActivityStats {
        self.activity.stats()
    }
}

/// Final result of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Session ID
    pub id: String,
    /// Terminal phase (`Done`, `Error` or `Cancelled`)
    pub phase: Phase,
    /// Set when `phase` is `Error`
    pub error: Option<ErrorInfo>,
    /// Counters at termination
    pub stats: ActivityStats,
}

/// A spawned session: control handle plus its task
#[derive(Debug)]
pub struct SessionTask {
    handle: SessionHandle,
    join: JoinHandle<SessionOutcome>,
}

impl SessionTask {
    /// Get the control handle
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Check if the task has terminated
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the terminal outcome
    pub async fn wait(self) -> Result<SessionOutcome> {
        self.join
            .await
            .map_err(|e| TapError::TaskFailed(e.to_string()))
    }
}

/// One tail operation over a streaming HTTP body
pub struct StreamSession {
    id: String,
    ref_id: String,
    name: String,
    url: Url,
    decoder: Box<dyn Decoder>,
    cursor: DecodeCursor,
    buffer: CircularSeriesBuffer,
    transport: Arc<dyn Transport>,
    phase: Phase,
    error: Option<ErrorInfo>,
    /// Set once a readable body was obtained
    opened: bool,
    activity: Arc<SessionActivity>,
    gate: Arc<PublishGate>,
    cancel: CancellationToken,
}

impl StreamSession {
    /// Create a session for one query target
    ///
    /// The session publishes to `states` and sizes its buffer to `capacity`.
    pub fn new(
        query: &TailQuery,
        url: Url,
        capacity: usize,
        transport: Arc<dyn Transport>,
        states: StateSender,
    ) -> Self {
        Self {
            id: query.session_id(),
            ref_id: query.ref_id.clone(),
            name: query.series_name(),
            url,
            decoder: query.format.decoder(),
            cursor: DecodeCursor::new(),
            buffer: CircularSeriesBuffer::with_capacity(capacity),
            transport,
            phase: Phase::Loading,
            error: None,
            opened: false,
            activity: Arc::new(SessionActivity::new()),
            gate: Arc::new(PublishGate::new(states)),
            cancel: CancellationToken::new(),
        }
    }

    /// Get the session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get a control handle
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id.clone(),
            cancel: self.cancel.clone(),
            gate: Arc::clone(&self.gate),
            activity: Arc::clone(&self.activity),
        }
    }

    /// Spawn the session on the tokio runtime
    pub fn spawn(self) -> SessionTask {
        let handle = self.handle();
        let join = tokio::spawn(self.run());
        SessionTask { handle, join }
    }

    /// Run the session to a terminal phase
    pub async fn run(mut self) -> SessionOutcome {
        let outcome = self.drive().await;
        self.gate.close();
        outcome
    }

    async fn drive(&mut self) -> SessionOutcome {
        debug!(id = %self.id, url = %self.url, "opening tail stream");

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            opened = self.transport.open(&self.url) => Some(opened),
        };
        let Some(opened) = opened else {
            return self.cancelled();
        };

        let body = match opened {
            Ok(opened) if !opened.is_success() => {
                let err = TransportError::Status {
                    status: opened.status,
                    status_text: opened.status_text,
                };
                if let Some(body) = opened.body {
                    body.abort();
                }
                return self.fail(&err);
            }
            Ok(Opened {
                body: Some(body), ..
            }) => body,
            Ok(Opened { body: None, .. }) => return self.fail(&TransportError::MissingBody),
            Err(err) => return self.fail(&err),
        };

        self.opened = true;
        self.phase = Phase::Streaming;
        info!(id = %self.id, capacity = self.buffer.capacity(), "tail stream open");

        if !self.publish() {
            body.abort();
            return self.cancelled();
        }

        self.stream(body).await
    }

    /// Read loop; exactly one read outstanding at a time
    async fn stream(&mut self, mut body: Box<dyn ChunkStream>) -> SessionOutcome {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = body.next_chunk() => Some(next),
            };

            match next {
                None => {
                    body.abort();
                    return self.cancelled();
                }
                Some(Ok(Some(chunk))) => {
                    self.ingest(&chunk);
                    if !self.publish() {
                        body.abort();
                        return self.cancelled();
                    }
                }
                Some(Ok(None)) => {
                    self.phase = Phase::Done;
                    let stats = self.activity.stats();
                    info!(
                        id = %self.id,
                        chunks = stats.chunk_count,
                        samples = stats.sample_count,
                        anomalies = stats.anomaly_count,
                        evicted = self.buffer.total_pushed() - self.buffer.len() as u64,
                        "tail stream finished"
                    );
                    self.publish();
                    return self.outcome();
                }
                Some(Err(err)) => {
                    body.abort();
                    return self.fail(&err);
                }
            }
        }
    }

    /// Decode one chunk into the buffer
    fn ingest(&mut self, chunk: &[u8]) {
        let chunk_count = self.activity.record_chunk(Utc::now());

        self.cursor.extend(chunk);
        let decoded = self.cursor.decode_with(self.decoder.as_ref());

        let anomalies = decoded.anomaly_count();
        if anomalies > 0 {
            debug!(id = %self.id, chunk_count, anomalies, "skipped malformed input");
        }

        let samples = decoded.samples.len();
        for sample in decoded.samples {
            self.buffer.push(sample);
        }
        self.activity.record_decoded(samples, anomalies);

        trace!(
            id = %self.id,
            chunk_count,
            bytes = chunk.len(),
            samples,
            pending = self.cursor.pending(),
            latest = ?self.buffer.latest().map(|s| s.value),
            "decoded chunk"
        );
    }

    /// Current state as an owned snapshot
    fn state(&self) -> SessionState {
        let stats = self.activity.stats();
        SessionState {
            id: self.id.clone(),
            name: self.name.clone(),
            phase: self.phase,
            error: self.error.clone(),
            series: self.opened.then(|| self.buffer.snapshot()),
            chunk_count: stats.chunk_count,
            last_activity: stats.last_activity,
        }
    }

    /// Publish the current state; false means stop reading
    fn publish(&self) -> bool {
        let delivered = self.gate.publish(|| self.state());
        if !delivered && !self.cancel.is_cancelled() {
            debug!(id = %self.id, "observer gone, stopping session");
        }
        delivered
    }

    fn fail(&mut self, err: &TransportError) -> SessionOutcome {
        warn!(id = %self.id, error = %err, "tail session failed");
        self.phase = Phase::Error;
        self.error = Some(ErrorInfo::from_transport(err, &self.ref_id));
        self.publish();
        self.outcome()
    }

    fn cancelled(&mut self) -> SessionOutcome {
        debug!(id = %self.id, "session cancelled");
        self.phase = Phase::Cancelled;
        self.outcome()
    }

    fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            id: self.id.clone(),
            phase: self.phase,
            error: self.error.clone(),
            stats: self.activity.stats(),
        }
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("url", &self.url.as_str())
            .field("phase", &self.phase)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
