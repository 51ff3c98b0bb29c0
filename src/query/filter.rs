use serde::{Deserialize, Serialize};

use super::record::{Queryable, field_value};
use super::sort::{SortExecutor, SortKey, SortOrder};
use crate::model::DealStage;

/// Stage selector of the deals list. `"all"` disables filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageFilter {
    #[default]
    All,
    Only(DealStage),
}

impl StageFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(DealStage::parse(trimmed))
        }
    }

    /// Records without a stage only pass `All`.
    pub fn matches(&self, stage: Option<&DealStage>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => stage == Some(wanted),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(stage) => stage.as_str(),
        }
    }
}

impl Serialize for StageFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StageFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Everything a list view applies to its collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewQuery {
    pub search_term: String,
    pub search_fields: Vec<String>,
    pub sort: Option<SortKey>,
    pub stage_filter: StageFilter,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search<I, S>(mut self, term: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_term = term.into();
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortKey::new(field, order));
        self
    }

    pub fn stage(mut self, filter: StageFilter) -> Self {
        self.stage_filter = filter;
        self
    }

    /// Search and stage filter, without sorting.
    pub fn matches<R: Queryable + ?Sized>(&self, record: &R) -> bool {
        self.stage_filter.matches(record.stage())
            && matches_search(record, &self.search_term.to_lowercase(), &self.search_fields)
    }
}

/// Case-insensitive substring match over any of `fields`. `needle` must be
/// lowercase; an empty needle matches every record.
pub fn matches_search<R: Queryable + ?Sized, S: AsRef<str>>(record: &R, needle: &str, fields: &[S]) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field_value(record, field.as_ref()).contains_lowercase(needle))
}

/// Filter then stable-sort a copy of `records`. The input is left untouched.
pub fn filter_and_sort<R: Queryable + Clone>(records: &[R], query: &ViewQuery) -> Vec<R> {
    let needle = query.search_term.to_lowercase();
    let mut selected: Vec<R> = records
        .iter()
        .filter(|record| query.stage_filter.matches(record.stage()))
        .filter(|record| matches_search(*record, &needle, &query.search_fields))
        .cloned()
        .collect();
    if let Some(key) = &query.sort {
        SortExecutor::sort(&mut selected, std::slice::from_ref(key));
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deal, Entity};
    use crate::normalize::RawRecord;
    use serde_json::json;

    fn deal(id: i64, title: &str, stage: &str, value: f64) -> Deal {
        Deal::from_record(&RawRecord::from_value(json!({
            "Id": id, "title_c": title, "stage_c": stage, "value_c": value
        })))
    }

    fn ids(deals: &[Deal]) -> Vec<i64> {
        deals.iter().map(|d| d.id).collect()
    }

    #[test]
    fn stage_filter_parse() {
        assert_eq!(StageFilter::parse("all"), StageFilter::All);
        assert_eq!(StageFilter::parse("ALL"), StageFilter::All);
        assert_eq!(StageFilter::parse("Closed Won"), StageFilter::Only(DealStage::ClosedWon));
        assert!(!StageFilter::parse("Lead").matches(None));
    }

    #[test]
    fn empty_search_keeps_everything_in_order() {
        let deals = vec![deal(1, "B", "Lead", 1.0), deal(2, "A", "Proposal", 2.0)];
        let query = ViewQuery::new().search("", ["title"]);
        assert_eq!(ids(&filter_and_sort(&deals, &query)), vec![1, 2]);
    }

    #[test]
    fn search_stage_and_sort_combine() {
        let deals = vec![
            deal(1, "Acme renewal", "Lead", 100.0),
            deal(2, "Acme upsell", "Proposal", 900.0),
            deal(3, "Globex", "Lead", 500.0),
            deal(4, "ACME pilot", "Lead", 300.0),
        ];
        let query = ViewQuery::new()
            .search("acme", ["title_c"])
            .stage(StageFilter::parse("Lead"))
            .sort_by("value", SortOrder::Desc);
        assert_eq!(ids(&filter_and_sort(&deals, &query)), vec![4, 1]);
    }

    #[test]
    fn query_deserializes_from_camel_case() {
        let query: ViewQuery = serde_json::from_value(json!({
            "searchTerm": "x",
            "searchFields": ["title"],
            "sort": {"field": "value", "order": "desc"},
            "stageFilter": "all"
        }))
        .unwrap();
        assert_eq!(query.sort, Some(SortKey::desc("value")));
        assert_eq!(query.stage_filter, StageFilter::All);
    }
}
