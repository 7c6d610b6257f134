//! Field flattening and sub-collection extraction
//!
//! Converts one raw record into a flat parent row plus any nested sub-table
//! rows, dispatching on the classified field envelope. Sub-table rows are
//! accumulated across a data-source's records by [`SubTableCollector`].

use crate::record::{record_id, FieldValue, RawRecord};
use rtab_common::FlatRow;
use serde_json::Value;
use std::collections::HashMap;

/// Column tying a sub-table row back to its parent record.
pub const MAIN_ID_COLUMN: &str = "main_id";

/// Flatten one record.
///
/// Returns the parent row and, for every sub-table field, the flattened child
/// rows collected under that field's name, in field order:
///
/// - creator/modifier fields emit `{field}_code` and `{field}_name`
/// - composite fields emit `{field}_{subkey}` per sub-key, one level deep; a
///   sub-value that is itself nested is stored as-is, not flattened further
/// - sub-table fields emit no parent column at all
/// - everything else emits `{field}` with the scalar value
pub fn flatten_record(record: &RawRecord) -> (FlatRow, Vec<(String, Vec<FlatRow>)>) {
    let mut parent = FlatRow::new();
    let mut children: Vec<(String, Vec<FlatRow>)> = Vec::new();

    for (field, envelope) in record {
        match FieldValue::classify(envelope) {
            FieldValue::CreatorOrModifier { code, name } => {
                parent.insert(format!("{}_code", field), code);
                parent.insert(format!("{}_name", field), name);
            },
            FieldValue::Composite(map) => {
                for (subkey, subvalue) in map {
                    parent.insert(format!("{}_{}", field, subkey), subvalue);
                }
            },
            FieldValue::Subtable(rows) => {
                let main_id = record_id(record);
                let child_rows = rows
                    .iter()
                    .map(|row| flatten_subtable_row(row, &main_id))
                    .collect();
                children.push((field.clone(), child_rows));
            },
            FieldValue::Scalar(value) => {
                parent.insert(field.clone(), value);
            },
        }
    }

    (parent, children)
}

/// One nested row: every sub-field's scalar value taken directly, with no
/// further type dispatch, plus the parent's identity under `main_id`.
fn flatten_subtable_row(row: &Value, main_id: &Value) -> FlatRow {
    let mut flat = FlatRow::new();

    if let Some(Value::Object(fields)) = row.get("value") {
        for (subkey, envelope) in fields {
            let value = envelope.get("value").cloned().unwrap_or(Value::Null);
            flat.insert(subkey.clone(), value);
        }
    }

    flat.insert(MAIN_ID_COLUMN.to_string(), main_id.clone());
    flat
}

/// Accumulates sub-table rows across all records of one data-source, keyed by
/// the originating field name. First-encounter order of field names is the
/// discovery order later used for positional sub-table naming; row order
/// within a field follows record order.
#[derive(Debug, Default)]
pub struct SubTableCollector {
    order: Vec<String>,
    rows: HashMap<String, Vec<FlatRow>>,
}

impl SubTableCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record's extracted sub-collections in. A sub-table field is
    /// registered on first encounter even when it carried no rows.
    pub fn collect(&mut self, children: Vec<(String, Vec<FlatRow>)>) {
        for (field, rows) in children {
            if !self.rows.contains_key(&field) {
                self.order.push(field.clone());
            }
            self.rows.entry(field).or_default().extend(rows);
        }
    }

    /// Drain into `(field name, rows)` pairs in discovery order.
    pub fn into_sub_collections(self) -> Vec<(String, Vec<FlatRow>)> {
        let Self { order, mut rows } = self;

        order
            .into_iter()
            .map(|field| {
                let collected = rows.remove(&field).unwrap_or_default();
                (field, collected)
            })
            .collect()
    }
}
