//! # comments-service - An HTTP/JSON Comments Service
//!
//! A small network service that stores and serves user comments attached to
//! arbitrary entities. Clients list, add, soft-delete and edit comments over
//! HTTP/1.x with JSON payloads; comments live in a wide-column table keyed
//! by entity.
//!
//! ## Features
//!
//! - **One-shot connections**: one request, one response, then close
//! - **Connection deadline**: every socket is closed at most 60s after accept
//! - **Parameterized statements**: request data is always bound, never spliced
//! - **Soft delete**: deleted comments stay stored but leave list views
//! - **Async I/O**: built on Tokio, one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          comments-service                               │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Comment    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────────────────┐ │
//! │  │  Deadline   │    │   HTTP      │    │  dyn Session                 │ │
//! │  │  (select!)  │    │   Parser    │    │  ┌────────┐ ┌────────┐       │ │
//! │  └─────────────┘    └─────────────┘    │  │Shard 0 │ │...N    │       │ │
//! │                                        │  │RwLock  │ │shards  │       │ │
//! │                                        │  └────────┘ └────────┘       │ │
//! │                                        └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use comments_service::comments::CommentHandler;
//! use comments_service::connection::{ConnectionConfig, ConnectionStats};
//! use comments_service::storage::StorageEngine;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = CommentHandler::new(Arc::new(StorageEngine::new()));
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!
//!     comments_service::server::serve(listener, handler, stats, ConnectionConfig::default()).await;
//! }
//! ```
//!
//! ## Routes
//!
//! | method | path               | headers                                         | body               |
//! |--------|--------------------|-------------------------------------------------|--------------------|
//! | GET    | `/comments`        | Entity, Pagination-Page, Pagination-Per-Page    |                    |
//! | POST   | `/comments/make`   | Author, Entity, Created_by                      | `{"text": string}` |
//! | PATCH  | `/comments/delete` | Entity, Comment_id, Created_time                |                    |
//! | PATCH  | `/comments/change` | Entity, Comment_id, Created_time                | `{"text": string}` |
//!
//! Unknown methods and paths answer 404. Malformed input, storage failures
//! and missing mutation targets answer 400.
//!
//! ## Module Overview
//!
//! - [`protocol`]: HTTP/1.x request parser and response serialization over `http` types
//! - [`storage`]: value model, statements, the `Session` seam, the cluster session and the engine
//! - [`comments`]: routing, request contexts, queries, pagination, decoding
//! - [`connection`]: per-connection state machine and deadline
//! - [`server`]: the accept loop
//! - [`config`]: command-line and environment options

pub mod comments;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use comments::CommentHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionConfig, ConnectionStats};
pub use protocol::{HttpParser, HttpRequest, HttpResponse, ParseError};
pub use storage::{ClusterSession, Session, StorageEngine};

/// The default port the service listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host the service binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Value of the `Server` response header
pub const SERVER_NAME: &str = "presetshare.comments";

/// Version of comments-service
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
