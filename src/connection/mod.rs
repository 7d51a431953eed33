//! Connection Handler Module
//!
//! This module manages individual client connections. Each connection is
//! handled by its own async task and carries exactly one request.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (server.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Parse HTTP  │───>│ Dispatch    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │        deadline ──> close            ┌─────────────┐        │
//! │                                      │ Send + close│        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use comments_service::comments::CommentHandler;
//! use comments_service::connection::{handle_connection, ConnectionConfig, ConnectionStats};
//! use comments_service::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let handler = CommentHandler::new(Arc::new(StorageEngine::new()));
//! let stats = Arc::new(ConnectionStats::new());
//!
//! // For each accepted connection...
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, handler.clone(), stats, ConnectionConfig::default()));
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{
    handle_connection, ConnectionConfig, ConnectionError, ConnectionHandler, ConnectionState,
    ConnectionStats, DEFAULT_DEADLINE,
};
