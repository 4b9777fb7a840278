//! In-memory transport for session tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::{ChunkStream, Opened, Transport};

/// Item pushed through a fake body
enum FeedItem {
    Chunk(Bytes),
    Fail(String),
}

/// Test-side handle that feeds a fake response body
///
/// Dropping the feed (or calling `finish`) ends the stream.
pub struct FakeFeed {
    tx: Option<mpsc::UnboundedSender<FeedItem>>,
    aborts: Arc<AtomicUsize>,
}

impl FakeFeed {
    /// Push one chunk; false if the body was dropped
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx
            .as_ref()
            .is_some_and(|tx| tx.send(FeedItem::Chunk(chunk.into())).is_ok())
    }

    /// Make the next read fail
    pub fn fail(&self, message: &str) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(FeedItem::Fail(message.to_string()));
        }
    }

    /// End the stream after already-sent chunks
    pub fn finish(&mut self) {
        self.tx = None;
    }

    /// Number of times the body was aborted
    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

/// Body half of a fake stream
pub struct FakeBody {
    rx: mpsc::UnboundedReceiver<FeedItem>,
    aborts: Arc<AtomicUsize>,
}

#[async_trait]
impl ChunkStream for FakeBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        match self.rx.recv().await {
            Some(FeedItem::Chunk(chunk)) => Ok(Some(chunk)),
            Some(FeedItem::Fail(message)) => Err(TransportError::Network(message)),
            None => Ok(None),
        }
    }

    fn abort(self: Box<Self>) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Create a connected feed/body pair
pub fn fake_stream() -> (FakeFeed, FakeBody) {
    let (tx, rx) = mpsc::unbounded_channel();
    let aborts = Arc::new(AtomicUsize::new(0));
    (
        FakeFeed {
            tx: Some(tx),
            aborts: Arc::clone(&aborts),
        },
        FakeBody { rx, aborts },
    )
}

/// Canned response for one resource name
pub enum FakeResponse {
    /// Respond with a status and a body that is never read
    Status(u16, &'static str, FakeBody),
    /// 200 with a streaming body
    Stream(FakeBody),
    /// 200 without a body
    NoBody,
    /// Fail before any response head
    Fail(String),
    /// Never answer
    Hang,
}

/// Transport that routes requests by their `name` query parameter
///
/// Requests without a `name` parameter are routed under the empty key.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, FakeResponse>>,
    requests: Mutex<Vec<Url>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response for a resource name
    pub fn route(&self, name: &str, response: FakeResponse) {
        self.routes.lock().insert(name.to_string(), response);
    }

    /// Register a streaming 200 response and return its feed
    pub fn stream(&self, name: &str) -> FakeFeed {
        let (feed, body) = fake_stream();
        self.route(name, FakeResponse::Stream(body));
        feed
    }

    /// Register a status-only response and return the feed of its body
    pub fn status(&self, name: &str, status: u16, text: &'static str) -> FakeFeed {
        let (feed, body) = fake_stream();
        self.route(name, FakeResponse::Status(status, text, body));
        feed
    }

    /// URLs requested so far
    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self, url: &Url) -> Result<Opened, TransportError> {
        self.requests.lock().push(url.clone());

        let name = url
            .query_pairs()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        let response = self.routes.lock().remove(&name);
        match response {
            Some(FakeResponse::Status(status, text, body)) => Ok(Opened {
                status,
                status_text: text.to_string(),
                body: Some(Box::new(body)),
            }),
            Some(FakeResponse::Stream(body)) => Ok(Opened {
                status: 200,
                status_text: "OK".into(),
                body: Some(Box::new(body)),
            }),
            Some(FakeResponse::NoBody) => Ok(Opened {
                status: 200,
                status_text: "OK".into(),
                body: None,
            }),
            Some(FakeResponse::Fail(message)) => Err(TransportError::Network(message)),
            Some(FakeResponse::Hang) => std::future::pending().await,
            None => Ok(Opened {
                status: 404,
                status_text: "Not Found".into(),
                body: None,
            }),
        }
    }
}
