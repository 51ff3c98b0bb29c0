use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, put_field};
use crate::core::{RecordId, Timestamp};
use crate::normalize::{FieldSpec, RawRecord};

pub mod fields {
    use crate::normalize::FieldSpec;

    pub const NAME: FieldSpec = FieldSpec::labelled("name", "name_c");
    pub const ORDER: FieldSpec = FieldSpec::new("order", "order_c");
    pub const DEAL_COUNT: FieldSpec = FieldSpec::new("dealCount", "deal_count_c");
    pub const TOTAL_VALUE: FieldSpec = FieldSpec::new("totalValue", "total_value_c");

    pub const ALL: [FieldSpec; 4] = [NAME, ORDER, DEAL_COUNT, TOTAL_VALUE];
}

/// A pipeline column. `deal_count` and `total_value` are whatever the
/// service cached and may be stale; views compute live totals instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: RecordId,
    pub name: String,
    pub order: i64,
    pub deal_count: Option<u64>,
    pub total_value: Option<f64>,
}

impl Entity for Stage {
    const KIND: EntityKind = EntityKind::Stage;
    type Patch = StagePatch;

    fn field_specs() -> &'static [FieldSpec] {
        &fields::ALL
    }

    fn from_record(raw: &RawRecord) -> Self {
        Self {
            id: raw.id().unwrap_or_default(),
            name: raw.text(&fields::NAME),
            order: raw.integer(&fields::ORDER),
            deal_count: raw
                .resolve(&fields::DEAL_COUNT)
                .map(|_| raw.integer(&fields::DEAL_COUNT).max(0) as u64),
            total_value: raw
                .resolve(&fields::TOTAL_VALUE)
                .map(|_| raw.number(&fields::TOTAL_VALUE)),
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn create_record(patch: &StagePatch, _now: Timestamp) -> RawRecord {
        Self::update_record(patch)
    }

    fn update_record(patch: &StagePatch) -> RawRecord {
        let mut record = RawRecord::new();
        put_field(&mut record, &fields::NAME, patch.name.clone());
        put_field(&mut record, &fields::ORDER, patch.order);
        record
    }
}

/// Stage aggregates are service-maintained, so a patch only carries the
/// name and display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePatch {
    pub name: Option<String>,
    pub order: Option<i64>,
}

impl StagePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}
