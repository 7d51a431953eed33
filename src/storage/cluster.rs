//! Cluster Session
//!
//! A [`Session`] backed by the `scylla` driver. Every [`Query`] is prepared
//! once at connect time; each execution binds the statement's values to the
//! matching prepared statement.
//!
//! Rows come back in select order, so the projection of a result is the
//! query's own [`Query::projection`].

use crate::storage::session::{check_binds, Session, StorageError, StorageResult};
use crate::storage::statement::{Query, Statement};
use crate::storage::value::{CqlValue, ResultSet, Row};
use async_trait::async_trait;
use scylla::client::session::Session as DriverSession;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use scylla::value::{CqlTimestamp, CqlValue as DriverValue, Row as DriverRow};
use std::collections::HashMap;
use tracing::{debug, error, info};

/// A connected driver session with the comment queries prepared.
pub struct ClusterSession {
    driver: DriverSession,
    prepared: HashMap<Query, PreparedStatement>,
}

impl ClusterSession {
    /// Connects to the cluster through `contact_points` (`host:port`) and
    /// prepares every query.
    pub async fn connect(contact_points: &[String]) -> StorageResult<Self> {
        let mut builder = SessionBuilder::new();
        for node in contact_points {
            builder = builder.known_node(node);
        }

        let driver = builder.build().await.map_err(|e| {
            error!(contact_points = ?contact_points, error = %e, "Unable to connect to db");
            StorageError::Connect(e.to_string())
        })?;

        let mut prepared = HashMap::with_capacity(Query::ALL.len());
        for query in Query::ALL {
            let statement = driver.prepare(query.cql()).await.map_err(|e| {
                error!(query = ?query, error = %e, "Unable to prepare query");
                StorageError::Connect(e.to_string())
            })?;
            prepared.insert(query, statement);
        }

        info!(contact_points = ?contact_points, "Connected to db");
        Ok(Self { driver, prepared })
    }
}

#[async_trait]
impl Session for ClusterSession {
    async fn execute(&self, statement: &Statement) -> StorageResult<ResultSet> {
        check_binds(statement)?;

        let prepared = self.prepared.get(&statement.query).ok_or_else(|| {
            StorageError::Execution(format!("query {:?} was not prepared", statement.query))
        })?;
        let values: Vec<Option<DriverValue>> = statement.values.iter().map(to_driver).collect();

        // the caller logs the failure; this adds the statement text
        let result = self
            .driver
            .execute_unpaged(prepared, values)
            .await
            .map_err(|e| {
                debug!(cql = statement.cql(), error = %e, "Query execution failed");
                StorageError::Execution(e.to_string())
            })?;

        if statement.query.is_mutation() {
            return Ok(ResultSet::empty());
        }

        let rows_result = result
            .into_rows_result()
            .map_err(|e| StorageError::Execution(e.to_string()))?;
        let typed = rows_result
            .rows::<DriverRow>()
            .map_err(|e| StorageError::Execution(e.to_string()))?;

        let mut rows = Vec::new();
        for row in typed {
            let row = row.map_err(|e| StorageError::Execution(e.to_string()))?;
            rows.push(from_driver_row(row)?);
        }

        Ok(ResultSet::new(statement.query.projection().to_vec(), rows))
    }
}

/// A bound value as the driver expects it. `Null` binds as an unset cell.
fn to_driver(value: &CqlValue) -> Option<DriverValue> {
    Some(match value {
        CqlValue::Uuid(id) => DriverValue::Uuid(*id),
        CqlValue::BigInt(n) => DriverValue::BigInt(*n),
        CqlValue::Int(n) => DriverValue::Int(*n),
        CqlValue::Boolean(b) => DriverValue::Boolean(*b),
        CqlValue::Double(d) => DriverValue::Double(*d),
        CqlValue::Text(s) => DriverValue::Text(s.clone()),
        CqlValue::Timestamp(ms) => DriverValue::Timestamp(CqlTimestamp(*ms)),
        CqlValue::Null => return None,
    })
}

fn from_driver_row(row: DriverRow) -> StorageResult<Row> {
    row.columns.into_iter().map(from_driver).collect()
}

fn from_driver(cell: Option<DriverValue>) -> StorageResult<CqlValue> {
    let value = match cell {
        None => return Ok(CqlValue::Null),
        Some(value) => value,
    };

    Ok(match value {
        DriverValue::Uuid(id) => CqlValue::Uuid(id),
        DriverValue::BigInt(n) => CqlValue::BigInt(n),
        DriverValue::Int(n) => CqlValue::Int(n),
        DriverValue::Boolean(b) => CqlValue::Boolean(b),
        DriverValue::Double(d) => CqlValue::Double(d),
        DriverValue::Text(s) | DriverValue::Ascii(s) => CqlValue::Text(s),
        DriverValue::Timestamp(CqlTimestamp(ms)) => CqlValue::Timestamp(ms),
        other => {
            return Err(StorageError::Execution(format!(
                "unsupported column value {:?}",
                other
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_null_binds_as_unset() {
        assert_eq!(to_driver(&CqlValue::Null), None);
        assert_eq!(from_driver(None), Ok(CqlValue::Null));
    }

    #[test]
    fn test_timestamp_keeps_millis() {
        assert_eq!(
            to_driver(&CqlValue::Timestamp(1_700_000_000_123)),
            Some(DriverValue::Timestamp(CqlTimestamp(1_700_000_000_123)))
        );
        assert_eq!(
            from_driver(Some(DriverValue::Timestamp(CqlTimestamp(-1)))),
            Ok(CqlValue::Timestamp(-1))
        );
    }

    #[test]
    fn test_insert_binds() {
        let id = Uuid::new_v4();
        let values = [
            CqlValue::Uuid(id),
            CqlValue::text("e1"),
            CqlValue::Boolean(false),
            CqlValue::BigInt(7),
        ];
        let bound: Vec<Option<DriverValue>> = values.iter().map(to_driver).collect();
        assert_eq!(
            bound,
            vec![
                Some(DriverValue::Uuid(id)),
                Some(DriverValue::Text("e1".to_string())),
                Some(DriverValue::Boolean(false)),
                Some(DriverValue::BigInt(7)),
            ]
        );
    }

    #[test]
    fn test_row_cells_in_order() {
        let id = Uuid::new_v4();
        let row = DriverRow {
            columns: vec![
                Some(DriverValue::Ascii("e1".to_string())),
                Some(DriverValue::BigInt(10)),
                Some(DriverValue::Uuid(id)),
                None,
            ],
        };
        assert_eq!(
            from_driver_row(row),
            Ok(vec![
                CqlValue::text("e1"),
                CqlValue::BigInt(10),
                CqlValue::Uuid(id),
                CqlValue::Null
            ])
        );
    }

    #[test]
    fn test_unsupported_cell_rejected() {
        let err = from_driver(Some(DriverValue::Blob(vec![1, 2]))).unwrap_err();
        assert!(err.to_string().contains("unsupported column value"));
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_connect_error() {
        let contact_points = vec!["127.0.0.1:1".to_string()];
        let result = tokio::time::timeout(
            Duration::from_secs(30),
            ClusterSession::connect(&contact_points),
        )
        .await
        .expect("connect attempt did not finish");

        match result {
            Err(StorageError::Connect(message)) => assert!(!message.is_empty()),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
