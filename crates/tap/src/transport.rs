//! Network seam for tail sessions
//!
//! `Transport` opens a streaming GET; `ChunkStream` yields the body one read
//! at a time. `HttpTransport` is the reqwest-backed implementation used in
//! production. Sessions only see the traits.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::error::TransportError;

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens streaming requests
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Issue a GET and return once the response head is available
    async fn open(&self, url: &Url) -> Result<Opened, TransportError>;
}

/// Body of an open response, read one chunk at a time
#[async_trait]
pub trait ChunkStream: Send {
    /// Next chunk, or `None` at end of stream
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError>;

    /// Abort the transfer and release the connection
    fn abort(self: Box<Self>) {}
}

/// Response head plus body
pub struct Opened {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase
    pub status_text: String,
    /// Readable body, if any
    pub body: Option<Box<dyn ChunkStream>>,
}

impl Opened {
    /// Check for a 2xx status
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for Opened {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opened")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default connect timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a transport with a custom connect timeout
    ///
    /// No total request timeout is set; tailed bodies stay open while the
    /// resource grows.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, url: &Url) -> Result<Opened, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        Ok(Opened {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: Some(Box::new(HttpBody { response })),
        })
    }
}

/// Streaming body of a reqwest response
struct HttpBody {
    response: reqwest::Response,
}

#[async_trait]
impl ChunkStream for HttpBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        Ok(self.response.chunk().await?)
    }

    fn abort(self: Box<Self>) {
        // Dropping the response closes the connection mid-transfer
        debug!(url = %self.response.url(), "aborting HTTP transfer");
    }
}
