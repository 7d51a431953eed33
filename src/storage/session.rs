//! Storage Session
//!
//! The `Session` trait is the seam between the comments service and a
//! wide-column driver. One session is created at startup and shared by every
//! connection task, so implementations must be safe for concurrent use.

use crate::storage::statement::{Query, Statement};
use crate::storage::value::ResultSet;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a storage session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// No session could be established with the cluster
    #[error("Unable to connect to db: {0}")]
    Connect(String),

    /// The store rejected or failed to run the statement
    #[error("unable to run query: {0}")]
    Execution(String),

    /// Bound values do not fit the statement's markers
    #[error("invalid bind for {query:?}: {reason}")]
    InvalidBind { query: Query, reason: String },

    /// A shard lock was poisoned by a panicking writer
    #[error("storage shard lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A connected, shareable handle to the store.
#[async_trait]
pub trait Session: Send + Sync {
    /// Executes one statement and returns its rows.
    async fn execute(&self, statement: &Statement) -> StorageResult<ResultSet>;
}

/// Checks that bound values line up with the query's markers.
///
/// `Null` is accepted for any marker.
pub fn check_binds(statement: &Statement) -> StorageResult<()> {
    let expected = statement.query.bind_types();
    if statement.values.len() != expected.len() {
        return Err(StorageError::InvalidBind {
            query: statement.query,
            reason: format!(
                "expected {} values, got {}",
                expected.len(),
                statement.values.len()
            ),
        });
    }

    for (index, (value, ty)) in statement.values.iter().zip(expected).enumerate() {
        match value.column_type() {
            None => {}
            Some(actual) if actual == *ty => {}
            Some(actual) => {
                return Err(StorageError::InvalidBind {
                    query: statement.query,
                    reason: format!("value {} is {:?}, expected {:?}", index, actual, ty),
                });
            }
        }
    }

    Ok(())
}
