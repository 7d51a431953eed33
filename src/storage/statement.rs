//! Parameterized Statements
//!
//! A `Statement` pairs one of the known comment-table queries with its bound
//! values. The query text only ever contains `?` markers; user input travels
//! exclusively in `values`, in marker order.

use crate::storage::value::{ColumnSpec, ColumnType, CqlValue};
use std::fmt;

/// Fully qualified name of the comments table.
pub const COMMENTS_TABLE: &str = "keyspace_comments.comments";

/// Projection returned by the list query, in output order.
pub const LIST_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("entity", ColumnType::Text),
    ColumnSpec::new("created_time", ColumnType::BigInt),
    ColumnSpec::new("comment_id", ColumnType::Uuid),
    ColumnSpec::new("author", ColumnType::Text),
    ColumnSpec::new("created_by", ColumnType::BigInt),
    ColumnSpec::new("text", ColumnType::Text),
    ColumnSpec::new("updated_time", ColumnType::BigInt),
];

/// Projection returned by the point lookup.
pub const LOOKUP_COLUMNS: [ColumnSpec; 1] = [ColumnSpec::new("comment_id", ColumnType::Uuid)];

/// The statements the comments service issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// `entity = ?` and not deleted, full projection
    SelectVisible,
    /// Exact `(entity, comment_id, created_time)` key and not deleted
    SelectOne,
    /// New row with every column bound
    Insert,
    /// Set `deleted = true` and refresh `updated_time` on an exact key
    SoftDelete,
    /// Set `text` and `updated_time` on an exact key
    UpdateText,
}

impl Query {
    /// Every query, in the order they are prepared at startup.
    pub const ALL: [Query; 5] = [
        Query::SelectVisible,
        Query::SelectOne,
        Query::Insert,
        Query::SoftDelete,
        Query::UpdateText,
    ];

    /// CQL text of the query.
    pub fn cql(&self) -> &'static str {
        match self {
            Query::SelectVisible => {
                "SELECT entity, created_time, comment_id, author, created_by, text, updated_time \
                 FROM keyspace_comments.comments WHERE entity = ? AND deleted = false \
                 ALLOW FILTERING"
            }
            Query::SelectOne => {
                "SELECT comment_id FROM keyspace_comments.comments \
                 WHERE entity = ? AND comment_id = ? AND created_time = ? AND deleted = false \
                 ALLOW FILTERING"
            }
            Query::Insert => {
                "INSERT INTO keyspace_comments.comments \
                 (comment_id, entity, author, text, deleted, created_by, created_time, updated_time) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            }
            Query::SoftDelete => {
                "UPDATE keyspace_comments.comments SET deleted = true, updated_time = ? \
                 WHERE entity = ? AND comment_id = ? AND created_time = ?"
            }
            Query::UpdateText => {
                "UPDATE keyspace_comments.comments SET text = ?, updated_time = ? \
                 WHERE entity = ? AND comment_id = ? AND created_time = ?"
            }
        }
    }

    /// Types of the bound values, in marker order.
    pub fn bind_types(&self) -> &'static [ColumnType] {
        use ColumnType::*;
        match self {
            Query::SelectVisible => &[Text],
            Query::SelectOne => &[Text, Uuid, BigInt],
            Query::SoftDelete => &[BigInt, Text, Uuid, BigInt],
            Query::Insert => &[Uuid, Text, Text, Text, Boolean, BigInt, BigInt, BigInt],
            Query::UpdateText => &[Text, BigInt, Text, Uuid, BigInt],
        }
    }

    /// Columns returned by the query, in select order. Empty for writes.
    pub fn projection(&self) -> &'static [ColumnSpec] {
        match self {
            Query::SelectVisible => &LIST_COLUMNS,
            Query::SelectOne => &LOOKUP_COLUMNS,
            Query::Insert | Query::SoftDelete | Query::UpdateText => &[],
        }
    }

    /// Returns true if the statement changes stored rows.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Query::Insert | Query::SoftDelete | Query::UpdateText)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cql())
    }
}

/// A query with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub query: Query,
    pub values: Vec<CqlValue>,
}

impl Statement {
    pub fn new(query: Query, values: Vec<CqlValue>) -> Self {
        Self { query, values }
    }

    pub fn cql(&self) -> &'static str {
        self.query.cql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_count_matches_bind_types() {
        for query in Query::ALL {
            let markers = query.cql().matches('?').count();
            assert_eq!(markers, query.bind_types().len(), "{:?}", query);
            assert!(query.cql().contains(COMMENTS_TABLE));
        }
    }

    #[test]
    fn test_list_projection_order() {
        let names: Vec<&str> = LIST_COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "entity",
                "created_time",
                "comment_id",
                "author",
                "created_by",
                "text",
                "updated_time"
            ]
        );
        assert!(Query::SelectVisible
            .cql()
            .starts_with(&format!("SELECT {}", names.join(", "))));
    }

    #[test]
    fn test_projection_only_for_reads() {
        for query in Query::ALL {
            assert_eq!(query.projection().is_empty(), query.is_mutation(), "{:?}", query);
        }
        assert_eq!(Query::SelectOne.projection()[0].name, "comment_id");
    }
}
