// ============================================================================
// src/query/sort.rs - Record Sorting
// ============================================================================
//
// - Comparator keyed by a user-chosen field and direction
// - Stable sort: equal records keep their input order in both directions
// - Missing values never fail a comparison (see `Queryable`)
//
// ============================================================================

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::{Queryable, field_value};

// ============================================================================
// SORT ORDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// `"asc"` / `"desc"`, case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Flip an ascending ordering for descending sorts.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

// ============================================================================
// SORT KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Compare two records by one field.
///
/// Text compares case-insensitively, dates chronologically, numbers
/// numerically. Usable on its own without any sorting state.
pub fn compare<R: Queryable + ?Sized>(a: &R, b: &R, field: &str, order: SortOrder) -> Ordering {
    order.apply(field_value(a, field).compare(&field_value(b, field)))
}

/// `compare` as -1 / 0 / 1.
pub fn compare_sign<R: Queryable + ?Sized>(a: &R, b: &R, field: &str, order: SortOrder) -> i8 {
    match compare(a, b, field, order) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

// ============================================================================
// RECORD COMPARATOR
// ============================================================================

/// Multi-key comparator; later keys only break ties of earlier ones.
pub struct RecordComparator<'a> {
    keys: &'a [SortKey],
}

impl<'a> RecordComparator<'a> {
    pub fn new(keys: &'a [SortKey]) -> Self {
        Self { keys }
    }

    pub fn compare<R: Queryable + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        for key in self.keys {
            let ordering = compare(a, b, &key.field, key.order);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

// ============================================================================
// SORT EXECUTOR
// ============================================================================

pub struct SortExecutor;

impl SortExecutor {
    /// Sort in place. `sort_by` is stable, so ties keep input order.
    pub fn sort<R: Queryable>(records: &mut [R], keys: &[SortKey]) {
        if records.len() < 2 || keys.is_empty() {
            return;
        }
        let comparator = RecordComparator::new(keys);
        records.sort_by(|a, b| comparator.compare(a, b));
    }
}

// ============================================================================
// SORT STATE
// ============================================================================

/// Column-header sort state of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: String,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Same field flips the direction; a different field starts ascending.
    pub fn toggle(&mut self, field: &str) {
        if self.field == field {
            self.order = self.order.toggled();
        } else {
            self.field = field.to_string();
            self.order = SortOrder::Asc;
        }
    }

    pub fn key(&self) -> SortKey {
        SortKey::new(self.field.clone(), self.order)
    }
}

// ============================================================================
// TESTS
// ============================================================================
