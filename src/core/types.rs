use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

/// Server-assigned record identifier.
pub type RecordId = i64;

pub type Timestamp = DateTime<Utc>;

/// Sort sentinel for records without a date: earlier than any real instant.
pub fn earliest() -> Timestamp {
    DateTime::<Utc>::MIN_UTC
}

/// Parse an id the way the record service does: leading integer digits win,
/// surrounding whitespace is ignored, anything else is not an id.
pub fn parse_id(raw: &str) -> Option<RecordId> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<RecordId>().ok().map(|id| id * sign)
}

/// Coerce a wire value into an id. Lookup fields arrive either as a bare
/// number/string or as an object carrying `Id`.
pub fn coerce_id(value: &JsonValue) -> Option<RecordId> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        JsonValue::String(s) => parse_id(s),
        JsonValue::Object(map) => map.get("Id").or_else(|| map.get("id")).and_then(coerce_id),
        _ => None,
    }
}

/// Anything a caller may hand the gateway as an id.
pub trait IntoRecordId {
    fn into_record_id(self) -> Option<RecordId>;
}

impl IntoRecordId for RecordId {
    fn into_record_id(self) -> Option<RecordId> {
        Some(self)
    }
}

impl IntoRecordId for i32 {
    fn into_record_id(self) -> Option<RecordId> {
        Some(self as RecordId)
    }
}

impl IntoRecordId for u32 {
    fn into_record_id(self) -> Option<RecordId> {
        Some(self as RecordId)
    }
}

impl IntoRecordId for u64 {
    fn into_record_id(self) -> Option<RecordId> {
        RecordId::try_from(self).ok()
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Option<RecordId> {
        parse_id(self)
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> Option<RecordId> {
        parse_id(&self)
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self) -> Option<RecordId> {
        parse_id(self)
    }
}

impl IntoRecordId for &JsonValue {
    fn into_record_id(self) -> Option<RecordId> {
        coerce_id(self)
    }
}

/// Parse a wire timestamp. Accepts RFC 3339, a naive date-time (taken as
/// UTC) and a bare calendar date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Timestamps on the wire are strings; epoch milliseconds are tolerated.
pub fn coerce_timestamp(value: &JsonValue) -> Option<Timestamp> {
    match value {
        JsonValue::String(s) => parse_timestamp(s),
        JsonValue::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
