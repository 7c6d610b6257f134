//! Record wire model
//!
//! The remote store returns each record as a mapping from field name to a
//! typed envelope `{"type": ..., "value": ...}`. Flattening policy is driven
//! by a closed classification of those envelopes, so every flattening rule is
//! an exhaustive match instead of string-tag branching at the use site.

use serde_json::Value;

/// One raw record as returned by the remote API, verbatim. Field order is
/// the document order of the response.
pub type RawRecord = serde_json::Map<String, Value>;

/// Identity field carried by every record; main tables are keyed by it.
pub const ID_FIELD: &str = "$id";

/// A field envelope, classified for flattening.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `CREATOR` / `MODIFIER`: a user reference with a code and display name
    CreatorOrModifier { code: Value, name: Value },

    /// `SUBTABLE`: an ordered sequence of nested rows
    Subtable(Vec<Value>),

    /// Any other envelope whose value is an object: one level of sub-fields
    Composite(serde_json::Map<String, Value>),

    /// Everything else: an atomic value
    Scalar(Value),
}

impl FieldValue {
    /// Classify one field envelope.
    ///
    /// The `type` tag wins first (`CREATOR`, `MODIFIER`, `SUBTABLE`); for all
    /// remaining tags the shape of `value` decides: objects are composites,
    /// anything else is a scalar. An envelope without a `value` key
    /// classifies as a null scalar.
    pub fn classify(envelope: &Value) -> Self {
        let type_tag = envelope.get("type").and_then(Value::as_str).unwrap_or("");
        let value = envelope.get("value").cloned().unwrap_or(Value::Null);

        match type_tag {
            "CREATOR" | "MODIFIER" => FieldValue::CreatorOrModifier {
                code: value.get("code").cloned().unwrap_or(Value::Null),
                name: value.get("name").cloned().unwrap_or(Value::Null),
            },
            "SUBTABLE" => match value {
                Value::Array(rows) => FieldValue::Subtable(rows),
                _ => FieldValue::Subtable(Vec::new()),
            },
            _ => match value {
                Value::Object(map) => FieldValue::Composite(map),
                other => FieldValue::Scalar(other),
            },
        }
    }
}

/// The record's `$id` value as sent by the remote store, or null when the
/// record lacks one.
pub fn record_id(record: &RawRecord) -> Value {
    record
        .get(ID_FIELD)
        .and_then(|envelope| envelope.get("value"))
        .cloned()
        .unwrap_or(Value::Null)
}
