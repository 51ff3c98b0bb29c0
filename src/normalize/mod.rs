//! Record normalization
//!
//! Records coming out of the record service use up to three spellings for
//! the same field: the suffixed storage column (`name_c`), the legacy flat
//! name (`name`) and, for the label column, the service's generic `Name`.
//! Every record is resolved exactly once, here, into the typed model; no
//! consumer downstream ever sees the variants.
//!
//! Precedence is: suffixed field, legacy field, generic label, default.

mod record;

pub use record::{LABEL_FIELD, ID_FIELD, RawRecord};

/// Where a logical field can be found on a wire record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Legacy flat name, also the canonical name used by views and queries.
    pub legacy: &'static str,
    /// Suffixed storage column.
    pub stored: &'static str,
    /// Whether the generic `Name` label column mirrors this field.
    pub label: bool,
}

impl FieldSpec {
    pub const fn new(legacy: &'static str, stored: &'static str) -> Self {
        Self {
            legacy,
            stored,
            label: false,
        }
    }

    pub const fn labelled(legacy: &'static str, stored: &'static str) -> Self {
        Self {
            legacy,
            stored,
            label: true,
        }
    }

    /// Wire keys in precedence order.
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> {
        [
            Some(self.stored),
            Some(self.legacy),
            self.label.then_some(LABEL_FIELD),
        ]
        .into_iter()
        .flatten()
    }
}

/// Map any accepted spelling of a field name to its canonical camelCase
/// form: `name_c` -> `name`, `Name` -> `name`, `expected_close_date_c` ->
/// `expectedCloseDate`. Canonical names pass through unchanged.
///
/// `Name` is only `name` for contacts and stages; `query::field_value`
/// resolves it per record type.
pub fn canonical_field_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == LABEL_FIELD {
        return "name".to_string();
    }
    if trimmed == ID_FIELD {
        return "id".to_string();
    }
    let base = trimmed.strip_suffix("_c").unwrap_or(trimmed);
    if !base.contains('_') {
        return base.to_string();
    }

    let mut out = String::with_capacity(base.len());
    let mut upper_next = false;
    for ch in base.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
