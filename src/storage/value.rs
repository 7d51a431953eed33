//! Wide-Column Value Model
//!
//! Values, column metadata and result sets as a CQL driver hands them back.
//! A `ResultSet` is a projection (ordered `ColumnSpec`s) plus rows whose
//! cells line up with that projection.

use std::fmt;
use uuid::Uuid;

/// Storage-native column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    BigInt,
    Int,
    Boolean,
    Double,
    Text,
    Timestamp,
}

/// A single cell value, typed the way the store reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    Uuid(Uuid),
    BigInt(i64),
    Int(i32),
    Boolean(bool),
    Double(f64),
    Text(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Null,
}

impl CqlValue {
    pub fn text(s: impl Into<String>) -> Self {
        CqlValue::Text(s.into())
    }

    /// The column type this value belongs to, or `None` for `Null`.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            CqlValue::Uuid(_) => Some(ColumnType::Uuid),
            CqlValue::BigInt(_) => Some(ColumnType::BigInt),
            CqlValue::Int(_) => Some(ColumnType::Int),
            CqlValue::Boolean(_) => Some(ColumnType::Boolean),
            CqlValue::Double(_) => Some(ColumnType::Double),
            CqlValue::Text(_) => Some(ColumnType::Text),
            CqlValue::Timestamp(_) => Some(ColumnType::Timestamp),
            CqlValue::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            CqlValue::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            CqlValue::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CqlValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Text rendering of a value. `Null` renders as the empty string.
impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlValue::Uuid(id) => write!(f, "{}", id.hyphenated()),
            CqlValue::BigInt(n) => write!(f, "{}", n),
            CqlValue::Int(n) => write!(f, "{}", n),
            CqlValue::Boolean(b) => write!(f, "{}", b),
            CqlValue::Double(d) => write!(f, "{}", d),
            CqlValue::Text(s) => f.write_str(s),
            CqlValue::Timestamp(ms) => write!(f, "{}", ms),
            CqlValue::Null => Ok(()),
        }
    }
}

/// Name and type of one projected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// One result row; cells are in projection order.
pub type Row = Vec<CqlValue>;

/// Rows returned by a statement together with their projection.
///
/// Mutations return an empty result set with no columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// An empty result with no projection, as returned by writes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows as `(column, value)` pairs.
    pub fn iter_rows<'a>(
        &'a self,
    ) -> impl Iterator<Item = impl Iterator<Item = (&'a ColumnSpec, &'a CqlValue)> + 'a> + 'a {
        self.rows
            .iter()
            .map(move |row| self.columns.iter().zip(row.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_text() {
        let id = Uuid::nil();
        assert_eq!(
            CqlValue::Uuid(id).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(CqlValue::BigInt(-5).to_string(), "-5");
        assert_eq!(CqlValue::Boolean(true).to_string(), "true");
        assert_eq!(CqlValue::text("hi").to_string(), "hi");
        assert_eq!(CqlValue::Null.to_string(), "");
    }

    #[test]
    fn test_column_type() {
        assert_eq!(CqlValue::BigInt(1).column_type(), Some(ColumnType::BigInt));
        assert_eq!(CqlValue::Null.column_type(), None);
    }

    #[test]
    fn test_iter_rows_pairs_columns() {
        let result = ResultSet::new(
            vec![
                ColumnSpec::new("a", ColumnType::Text),
                ColumnSpec::new("b", ColumnType::BigInt),
            ],
            vec![vec![CqlValue::text("x"), CqlValue::BigInt(2)]],
        );

        let pairs: Vec<(&str, CqlValue)> = result
            .iter_rows()
            .flat_map(|row| row.map(|(c, v)| (c.name, v.clone())))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", CqlValue::text("x")), ("b", CqlValue::BigInt(2))]
        );
    }
}
