//! Turns storage rows into JSON records.
//!
//! Dispatch is on the cell's storage type: UUIDs become their hyphenated
//! text, 64-bit integers stay numbers, booleans stay booleans, and every
//! other type falls back to its text form. Decoding never fails.

use crate::storage::{ColumnSpec, CqlValue, ResultSet};
use serde_json::{Map, Value};

/// A decoded row, keys in projection order.
pub type Record = Map<String, Value>;

/// Decodes one cell.
pub fn decode_value(value: &CqlValue) -> Value {
    match value {
        CqlValue::Uuid(id) => Value::String(id.hyphenated().to_string()),
        CqlValue::BigInt(n) => Value::from(*n),
        CqlValue::Boolean(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

/// Decodes one row given its `(column, value)` pairs.
pub fn decode_row<'a, I>(cells: I) -> Record
where
    I: IntoIterator<Item = (&'a ColumnSpec, &'a CqlValue)>,
{
    cells
        .into_iter()
        .map(|(column, value)| (column.name.to_string(), decode_value(value)))
        .collect()
}

/// Decodes every row of a result set.
pub fn decode_rows(result: &ResultSet) -> Vec<Record> {
    result.iter_rows().map(decode_row).collect()
}
