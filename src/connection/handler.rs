//! Connection Handler Module
//!
//! This module handles individual client connections. Every connection is
//! one-shot: one request is read, one response is written, then the socket
//! is closed.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned (Idle), deadline armed
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐      ┌──────────────────┐
//!    │  Reading                     │      │  Deadline        │
//!    │  read until a full request   │      │  (default 60s)   │
//!    └───────────┬──────────────────┘      │                  │
//!                │                         │  on fire: drop   │
//!                ▼                         │  the socket in   │
//!    ┌──────────────────────────────┐      │  any state       │
//!    │  Processing                  │      │                  │
//!    │  CommentHandler + metadata   │      │                  │
//!    └───────────┬──────────────────┘      │                  │
//!                │                         │                  │
//!                ▼                         │                  │
//!    ┌──────────────────────────────┐      │                  │
//!    │  Writing                     │      │                  │
//!    │  write, flush, shutdown      │      │                  │
//!    └───────────┬──────────────────┘      └──────────────────┘
//!                │
//!                ▼
//! 4. Closed
//! ```
//!
//! A transport or parse failure while reading closes the socket without a
//! response. When the deadline fires the in-flight request future is
//! dropped, which also abandons any storage call it was awaiting.
//!
//! ## Buffer Management
//!
//! We use a BytesMut buffer to accumulate incoming data. TCP is a stream
//! protocol, so a request may arrive split across several reads.

use crate::comments::CommentHandler;
use crate::protocol::parser::DEFAULT_MAX_BODY_SIZE;
use crate::protocol::{
    header, response, HeaderValue, HttpParser, HttpRequest, HttpResponse, ParseError, StatusCode,
};
use crate::SERVER_NAME;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Default time a connection may stay open
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Per-connection limits, copied into every connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Time from accept until the socket is forcibly closed
    pub deadline: Duration,
    /// Largest accepted request body
    pub max_body_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Where a connection is in its single request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Reading,
    Processing,
    Writing,
    Closed,
}

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total requests processed
    pub requests_processed: AtomicU64,
    /// Responses with a 2xx status
    pub responses_success: AtomicU64,
    /// Responses with a 4xx status
    pub responses_client_error: AtomicU64,
    /// Connections closed by the deadline
    pub deadlines_fired: AtomicU64,
    /// Connections closed by a read, parse or write failure
    pub transport_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_processed(&self, status: StatusCode) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
        if status.is_success() {
            self.responses_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.responses_client_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn deadline_fired(&self) {
        self.deadlines_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so tests can drive it with mock I/O.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The request dispatcher (shared across connections)
    handler: CommentHandler,

    /// HTTP request parser
    parser: HttpParser,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,

    config: ConnectionConfig,

    state: ConnectionState,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `addr` - The client's socket address
    /// * `handler` - The request dispatcher
    /// * `stats` - Shared connection statistics
    /// * `config` - Deadline and size limits
    pub fn new(
        stream: S,
        addr: SocketAddr,
        handler: CommentHandler,
        stats: Arc<ConnectionStats>,
        config: ConnectionConfig,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            handler,
            parser: HttpParser::with_max_body_size(config.max_body_size),
            stats,
            config,
            state: ConnectionState::Idle,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Serves the single exchange under the connection deadline.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.addr, "Client connected");

        let deadline = self.config.deadline;
        let result = tokio::select! {
            result = self.serve() => result,
            _ = tokio::time::sleep(deadline) => Err(ConnectionError::DeadlineElapsed(deadline)),
        };
        let last_state = self.state;
        self.transition(ConnectionState::Closed);

        match &result {
            Ok(()) => debug!(client = %self.addr, "Connection closed"),
            Err(ConnectionError::DeadlineElapsed(after)) => {
                self.stats.deadline_fired();
                debug!(
                    client = %self.addr,
                    state = ?last_state,
                    after = ?after,
                    "Deadline elapsed, closing connection"
                );
            }
            Err(e) => {
                self.stats.transport_error();
                match e {
                    ConnectionError::ClientDisconnected => {
                        debug!(client = %self.addr, "Client disconnected")
                    }
                    ConnectionError::IoError(io_err)
                        if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                    {
                        debug!(client = %self.addr, "Connection reset by client")
                    }
                    _ => warn!(client = %self.addr, error = %e, "Connection error"),
                }
            }
        }

        self.stats.connection_closed();
        result
    }

    /// Reading -> Processing -> Writing -> Closed.
    async fn serve(&mut self) -> Result<(), ConnectionError> {
        self.transition(ConnectionState::Reading);
        let request = self.read_request().await?;

        self.transition(ConnectionState::Processing);
        let response = self.process(&request).await;

        self.transition(ConnectionState::Writing);
        self.send_response(&response).await?;

        self.transition(ConnectionState::Closed);
        Ok(())
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            trace!(client = %self.addr, from = ?self.state, to = ?next, "State transition");
            self.state = next;
        }
    }

    /// Reads until one complete request is buffered.
    async fn read_request(&mut self) -> Result<HttpRequest, ConnectionError> {
        loop {
            if let Some(request) = self.try_parse_request()? {
                return Ok(request);
            }
            self.read_more_data().await?;
        }
    }

    /// Attempts to parse a request from the buffer.
    fn try_parse_request(&mut self) -> Result<Option<HttpRequest>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.parser.parse(&self.buffer) {
            Ok(Some((request, consumed))) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    consumed = consumed,
                    ignored = self.buffer.len(),
                    "Parsed request"
                );
                Ok(Some(request))
            }
            Ok(None) => {
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete request, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Parse error");
                Err(ConnectionError::ParseError(e))
            }
        }
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= self.parser.max_request_size() {
            warn!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial request in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Runs the request and stamps the transport metadata on the response.
    async fn process(&self, request: &HttpRequest) -> HttpResponse {
        let mut response = self.handler.execute(request).await;

        *response.version_mut() = request.version();
        let headers = response.headers_mut();
        headers.insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));

        self.stats.request_processed(response.status());
        debug!(
            client = %self.addr,
            method = %request.method(),
            target = %request.uri(),
            status = response.status().as_u16(),
            "Request processed"
        );
        response
    }

    /// Writes the response and shuts down the send half.
    async fn send_response(&mut self, response: &HttpResponse) -> Result<(), ConnectionError> {
        let bytes = response::serialize(response);
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
///
/// None of these reach the client; the socket is just closed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed request
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client closed before sending anything
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial request)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("Buffer size limit exceeded")]
    BufferFull,

    /// The connection outlived its deadline
    #[error("Deadline of {0:?} elapsed")]
    DeadlineElapsed(Duration),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Failures are logged by the handler itself.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    handler: CommentHandler,
    stats: Arc<ConnectionStats>,
    config: ConnectionConfig,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let connection = ConnectionHandler::new(stream, addr, handler, stats, config);
    let _ = connection.run().await;
}
