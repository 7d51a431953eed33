//! In-Memory Wide-Column Storage Engine
//!
//! This module implements the comments table in memory: one partition per
//! entity, rows clustered by `(created_time, comment_id)` inside the
//! partition, and a soft-delete flag that hides rows from the list query.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Partitions are spread over shards so that requests
//!    for different entities do not contend on one lock.
//! 2. **Ordered Partitions**: A `BTreeMap` keyed by the clustering key keeps
//!    list results in a stable oldest-first order.
//! 3. **Prepared Queries**: The engine only runs the statements the
//!    QueryBuilder emits and checks every bound value before touching data.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ entity→ │ │ entity→ │ │ entity→ │ │ entity→ │           │
//! │  │ BTreeMap│ │ BTreeMap│ │ BTreeMap│ │ BTreeMap│           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::storage::session::{check_binds, Session, StorageError, StorageResult};
use crate::storage::statement::{Query, Statement};
use crate::storage::value::{CqlValue, ResultSet, Row};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

/// Default number of shards for the storage engine.
pub const DEFAULT_SHARDS: usize = 64;

/// A persisted comment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: Uuid,
    pub entity: String,
    pub author: String,
    pub created_by: i64,
    pub text: String,
    pub deleted: bool,
    pub created_time: i64,
    pub updated_time: i64,
}

impl Comment {
    /// Cells for the list projection, in `LIST_COLUMNS` order.
    fn list_row(&self) -> Row {
        vec![
            CqlValue::Text(self.entity.clone()),
            CqlValue::BigInt(self.created_time),
            CqlValue::Uuid(self.comment_id),
            CqlValue::Text(self.author.clone()),
            CqlValue::BigInt(self.created_by),
            CqlValue::Text(self.text.clone()),
            CqlValue::BigInt(self.updated_time),
        ]
    }
}

/// Clustering key inside an entity partition.
type ClusteringKey = (i64, Uuid);

/// Rows of one entity.
type Partition = BTreeMap<ClusteringKey, Comment>;

/// A single shard containing a portion of the partitions.
#[derive(Debug, Default)]
struct Shard {
    partitions: RwLock<HashMap<String, Partition>>,
}

/// Statistics about the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Stored rows, soft-deleted included
    pub rows: u64,
    /// Select statements executed
    pub reads: u64,
    /// Insert/update statements executed
    pub writes: u64,
}

/// The in-memory comments table.
///
/// # Thread Safety
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all connection tasks as the process-wide [`Session`].
///
/// # Example
///
/// ```
/// use comments_service::storage::{CqlValue, Query, Statement, StorageEngine};
///
/// let engine = StorageEngine::new();
/// let list = Statement::new(Query::SelectVisible, vec![CqlValue::text("post-1")]);
/// let result = engine.apply(&list).unwrap();
/// assert_eq!(result.row_count(), 0);
/// assert_eq!(result.columns.len(), 7);
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,
    row_count: AtomicU64,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("rows", &self.row_count.load(Ordering::Relaxed))
            .field("reads", &self.read_count.load(Ordering::Relaxed))
            .field("writes", &self.write_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a new storage engine with default settings.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates a storage engine with `shards` partitions groups (at least one).
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1)).map(|_| Shard::default()).collect();

        Self {
            shards,
            row_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    /// Determines which shard an entity partition belongs to.
    #[inline]
    fn shard_index(&self, entity: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        entity.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    #[inline]
    fn get_shard(&self, entity: &str) -> &Shard {
        &self.shards[self.shard_index(entity)]
    }

    /// Runs a statement synchronously.
    pub fn apply(&self, statement: &Statement) -> StorageResult<ResultSet> {
        check_binds(statement)?;
        trace!(query = ?statement.query, "Executing statement");

        let values = &statement.values;
        match statement.query {
            Query::SelectVisible => self.select_visible(text_at(values, 0)?),
            Query::SelectOne => self.select_one(
                text_at(values, 0)?,
                (bigint_at(values, 2)?, uuid_at(values, 1)?),
            ),
            Query::Insert => self.insert(Comment {
                comment_id: uuid_at(values, 0)?,
                entity: text_at(values, 1)?.to_string(),
                author: text_at(values, 2)?.to_string(),
                text: text_at(values, 3)?.to_string(),
                deleted: bool_at(values, 4)?,
                created_by: bigint_at(values, 5)?,
                created_time: bigint_at(values, 6)?,
                updated_time: bigint_at(values, 7)?,
            }),
            Query::SoftDelete => {
                let updated_time = bigint_at(values, 0)?;
                self.update_row(
                    text_at(values, 1)?,
                    (bigint_at(values, 3)?, uuid_at(values, 2)?),
                    |row| {
                        row.deleted = true;
                        row.updated_time = updated_time;
                    },
                )
            }
            Query::UpdateText => {
                let text = text_at(values, 0)?.to_string();
                let updated_time = bigint_at(values, 1)?;
                self.update_row(
                    text_at(values, 2)?,
                    (bigint_at(values, 4)?, uuid_at(values, 3)?),
                    move |row| {
                        row.text = text;
                        row.updated_time = updated_time;
                    },
                )
            }
        }
    }

    fn select_visible(&self, entity: &str) -> StorageResult<ResultSet> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let partitions = self
            .get_shard(entity)
            .partitions
            .read()
            .map_err(|_| StorageError::Poisoned)?;

        let rows = partitions
            .get(entity)
            .map(|partition| {
                partition
                    .values()
                    .filter(|row| !row.deleted)
                    .map(Comment::list_row)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultSet::new(Query::SelectVisible.projection().to_vec(), rows))
    }

    fn select_one(&self, entity: &str, key: ClusteringKey) -> StorageResult<ResultSet> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let partitions = self
            .get_shard(entity)
            .partitions
            .read()
            .map_err(|_| StorageError::Poisoned)?;

        let rows = partitions
            .get(entity)
            .and_then(|partition| partition.get(&key))
            .filter(|row| !row.deleted)
            .map(|row| vec![vec![CqlValue::Uuid(row.comment_id)]])
            .unwrap_or_default();

        Ok(ResultSet::new(Query::SelectOne.projection().to_vec(), rows))
    }

    /// Inserts a row, overwriting any row with the same key.
    fn insert(&self, comment: Comment) -> StorageResult<ResultSet> {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut partitions = self
            .get_shard(&comment.entity)
            .partitions
            .write()
            .map_err(|_| StorageError::Poisoned)?;

        let key = (comment.created_time, comment.comment_id);
        let previous = partitions
            .entry(comment.entity.clone())
            .or_default()
            .insert(key, comment);

        if previous.is_none() {
            self.row_count.fetch_add(1, Ordering::Relaxed);
        }

        Ok(ResultSet::empty())
    }

    /// Applies `change` to the row at `key`. A missing row is left missing.
    fn update_row<F>(&self, entity: &str, key: ClusteringKey, change: F) -> StorageResult<ResultSet>
    where
        F: FnOnce(&mut Comment),
    {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut partitions = self
            .get_shard(entity)
            .partitions
            .write()
            .map_err(|_| StorageError::Poisoned)?;

        match partitions
            .get_mut(entity)
            .and_then(|partition| partition.get_mut(&key))
        {
            Some(row) => change(row),
            None => trace!(entity = entity, "Update matched no row"),
        }

        Ok(ResultSet::empty())
    }

    /// Reads a row by exact key, soft-deleted rows included.
    pub fn get(&self, entity: &str, comment_id: Uuid, created_time: i64) -> Option<Comment> {
        let partitions = self.get_shard(entity).partitions.read().ok()?;
        partitions
            .get(entity)
            .and_then(|partition| partition.get(&(created_time, comment_id)))
            .cloned()
    }

    /// Returns the number of stored rows, soft-deleted included.
    pub fn len(&self) -> usize {
        self.row_count.load(Ordering::Relaxed) as usize
    }

    /// Returns true if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns engine statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            rows: self.row_count.load(Ordering::Relaxed),
            reads: self.read_count.load(Ordering::Relaxed),
            writes: self.write_count.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Session for StorageEngine {
    async fn execute(&self, statement: &Statement) -> StorageResult<ResultSet> {
        self.apply(statement)
    }
}

// ============================================================================
// Bound value accessors
// ============================================================================

fn null_value(index: usize) -> StorageError {
    StorageError::Execution(format!("invalid null value for bind marker {}", index))
}

fn text_at(values: &[CqlValue], index: usize) -> StorageResult<&str> {
    values
        .get(index)
        .and_then(CqlValue::as_text)
        .ok_or_else(|| null_value(index))
}

fn bigint_at(values: &[CqlValue], index: usize) -> StorageResult<i64> {
    values
        .get(index)
        .and_then(CqlValue::as_bigint)
        .ok_or_else(|| null_value(index))
}

fn uuid_at(values: &[CqlValue], index: usize) -> StorageResult<Uuid> {
    values
        .get(index)
        .and_then(CqlValue::as_uuid)
        .ok_or_else(|| null_value(index))
}

fn bool_at(values: &[CqlValue], index: usize) -> StorageResult<bool> {
    values
        .get(index)
        .and_then(CqlValue::as_bool)
        .ok_or_else(|| null_value(index))
}
