use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::FieldSpec;
use crate::core::{RecordId, Timestamp, coerce_id, coerce_timestamp};

/// The record service's generic label column.
pub const LABEL_FIELD: &str = "Name";

/// The record service's primary key column.
pub const ID_FIELD: &str = "Id";

/// A record exactly as it travels over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, JsonValue>);

impl RawRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value; anything but an object yields an empty record.
    pub fn from_value(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Primary key, accepting `Id` or a legacy `id`.
    pub fn id(&self) -> Option<RecordId> {
        self.0
            .get(ID_FIELD)
            .or_else(|| self.0.get("id"))
            .and_then(coerce_id)
    }

    /// Overlay every field of `patch` onto this record.
    pub fn merge(&mut self, patch: &RawRecord) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Keep only `fields` (plus the primary key).
    pub fn project(&self, fields: &[String]) -> RawRecord {
        let mut projected = Map::new();
        for (key, value) in &self.0 {
            if key == ID_FIELD || fields.iter().any(|f| f == key) {
                projected.insert(key.clone(), value.clone());
            }
        }
        RawRecord(projected)
    }

    // ------------------------------------------------------------------
    // Precedence resolution
    // ------------------------------------------------------------------

    /// First present value for `spec`, in precedence order. Null and blank
    /// strings count as absent.
    pub fn resolve(&self, spec: &FieldSpec) -> Option<&JsonValue> {
        spec.candidates()
            .filter_map(|key| self.0.get(key))
            .find(|value| is_present(value))
    }

    pub fn text(&self, spec: &FieldSpec) -> String {
        self.resolve(spec).map(json_to_text).unwrap_or_default()
    }

    pub fn optional_text(&self, spec: &FieldSpec) -> Option<String> {
        self.resolve(spec).map(json_to_text)
    }

    /// Numeric field; missing or unparsable values read as zero.
    pub fn number(&self, spec: &FieldSpec) -> f64 {
        self.resolve(spec).and_then(json_to_f64).unwrap_or(0.0)
    }

    pub fn integer(&self, spec: &FieldSpec) -> i64 {
        let value = self.number(spec);
        if value.is_finite() { value.trunc() as i64 } else { 0 }
    }

    /// Foreign key. Zero and negative ids mean "unset".
    pub fn reference(&self, spec: &FieldSpec) -> Option<RecordId> {
        self.resolve(spec).and_then(coerce_id).filter(|id| *id > 0)
    }

    pub fn timestamp(&self, spec: &FieldSpec) -> Option<Timestamp> {
        self.resolve(spec).and_then(coerce_timestamp)
    }
}

impl From<Map<String, JsonValue>> for RawRecord {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<RawRecord> for JsonValue {
    fn from(record: RawRecord) -> Self {
        JsonValue::Object(record.0)
    }
}

fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Object(map) => map
            .get(LABEL_FIELD)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn json_to_f64(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}
