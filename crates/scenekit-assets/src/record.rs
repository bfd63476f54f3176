//! Flat key-value asset records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the store-wide unique identifier (`<group>.<localId>`).
pub const FULL_ID_FIELD: &str = "fullId";
/// Field holding the asset group name a record was loaded under.
pub const SOURCE_FIELD: &str = "source";
/// Field marking records created by a dynamic data load.
pub const CUSTOM_ASSET_FIELD: &str = "isCustomAsset";
/// Default local identifier field.
pub const ID_FIELD: &str = "id";

/// One flat asset record: an insertion-ordered map of field name to value.
///
/// Values are dynamically typed (`serde_json::Value`); identifier fields are
/// always strings (see [`crate::formats::ParseOptions`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a field as a string slice, if it is a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether the field is present and non-null.
    pub fn is_present(&self, field: &str) -> bool {
        !matches!(self.fields.get(field), None | Some(Value::Null))
    }

    /// Set a field value, replacing any existing value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Set a field only if it is currently absent or null.
    pub fn set_default(&mut self, field: &str, value: Value) {
        let slot = self
            .fields
            .entry(field.to_string())
            .or_insert(Value::Null);
        if slot.is_null() {
            *slot = value;
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// The record's full identifier, if assigned.
    pub fn full_id(&self) -> Option<&str> {
        self.get_str(FULL_ID_FIELD)
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of the record restricted to the named fields, in the order
    /// given. Absent fields are simply omitted.
    pub fn project(&self, fields: &[String]) -> Record {
        fields
            .iter()
            .filter_map(|f| self.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }

    /// Convert the record into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields.into_iter().collect())
    }

    /// Build a record from a JSON object value. Returns `None` for
    /// non-object values.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map.into_iter().collect(),
            }),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Derive the field schema observed across a set of records: the union of
/// field names, ordered by first appearance.
pub fn extract_fields(records: &[Record]) -> Vec<String> {
    let mut seen = IndexMap::new();
    for record in records {
        for key in record.keys() {
            seen.entry(key.to_string()).or_insert(());
        }
    }
    seen.into_keys().collect()
}
