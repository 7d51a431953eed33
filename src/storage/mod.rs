//! Storage Module
//!
//! This module holds everything between the comments service and the
//! wide-column store: the value model, parameterized statements, the
//! `Session` driver seam, the cluster session backed by the `scylla` driver,
//! and an in-memory engine implementing the same seam.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   Statement    ┌──────────────────────────────┐
//! │ QueryBuilder │ ─────────────> │  dyn Session (shared handle) │
//! └──────────────┘                │                              │
//!                                 │   ClusterSession (driver)    │
//!                                 │   or StorageEngine           │
//! ┌──────────────┐   ResultSet    │   ┌────────┐ ┌────────┐      │
//! │ RowDecoder   │ <───────────── │   │Shard 0 │ │Shard N │ ...  │
//! └──────────────┘                │   └────────┘ └────────┘      │
//!                                 └──────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use comments_service::storage::{CqlValue, Query, Session, Statement, StorageEngine};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let session: Arc<dyn Session> = Arc::new(StorageEngine::new());
//! let statement = Statement::new(Query::SelectVisible, vec![CqlValue::text("post-1")]);
//! let rows = session.execute(&statement).await.unwrap();
//! assert!(rows.is_empty());
//! # });
//! ```

pub mod cluster;
pub mod engine;
pub mod session;
pub mod statement;
pub mod value;

// Re-export commonly used types
pub use cluster::ClusterSession;
pub use engine::{Comment, StorageEngine, StorageStats, DEFAULT_SHARDS};
pub use session::{Session, StorageError, StorageResult};
pub use statement::{Query, Statement, COMMENTS_TABLE, LIST_COLUMNS, LOOKUP_COLUMNS};
pub use value::{ColumnSpec, ColumnType, CqlValue, ResultSet, Row};
