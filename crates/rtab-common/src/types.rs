//! Tabular types shared across RTAB
//!
//! A [`Table`] is an ordered sequence of [`FlatRow`]s sharing one column set.
//! Rows are allowed to be heterogeneous: the table's column set is the union
//! of the columns seen across all rows, in first-encounter order, and a row
//! that lacks a column simply reads as null.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One flattened row: derived column name mapped to a scalar JSON value.
///
/// `serde_json` is built with `preserve_order`, so iteration follows
/// insertion order. Column discovery order therefore follows the order in
/// which values were first written into a row.
pub type FlatRow = serde_json::Map<String, Value>;

/// An ordered, named-column view over a sequence of flat rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl Table {
    /// Build a table from rows, deriving the column set as the union of the
    /// columns present across all rows, in first-encounter order.
    pub fn from_rows(rows: Vec<FlatRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for column in row.keys() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// The column set, in first-encounter order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in insertion order.
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read one cell. Returns `None` both for an out-of-range row and for a
    /// column the row does not carry; absent cells are nulls, not errors.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Left outer join: every row of `self` appears exactly once in the
    /// result, extended with the columns of the first `right` row whose
    /// `right_on` value equals this row's `left_on` value, or with nulls when
    /// no such row exists. Unmatched `right` rows are never injected.
    ///
    /// A `right` column whose name collides with one of `self`'s columns is
    /// carried under `{name}_right`.
    pub fn left_join(&self, right: &Table, left_on: &str, right_on: &str) -> Table {
        let mut index: HashMap<String, &FlatRow> = HashMap::new();
        for row in &right.rows {
            if let Some(key) = row.get(right_on) {
                index.entry(join_key(key)).or_insert(row);
            }
        }

        let right_names: Vec<String> = right
            .columns
            .iter()
            .map(|column| {
                if self.columns.iter().any(|c| c == column) {
                    format!("{}_right", column)
                } else {
                    column.clone()
                }
            })
            .collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matched = row
                .get(left_on)
                .and_then(|key| index.get(&join_key(key)).copied());

            let mut out = row.clone();
            for (column, name) in right.columns.iter().zip(&right_names) {
                let value = matched
                    .and_then(|r| r.get(column))
                    .cloned()
                    .unwrap_or(Value::Null);
                out.insert(name.clone(), value);
            }
            rows.push(out);
        }

        let mut columns = self.columns.clone();
        columns.extend(right_names);
        Table { columns, rows }
    }
}

/// Join keys are compared by their JSON rendering, so a string `"1"` and a
/// number `1` never collide.
fn join_key(value: &Value) -> String {
    value.to_string()
}
