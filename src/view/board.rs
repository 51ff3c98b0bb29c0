use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Deal, DealStage, Stage};

/// Header accent of a stage column. Unrecognized stages are `Gray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStyle {
    Purple,
    Blue,
    Amber,
    Orange,
    Green,
    Red,
    Gray,
}

impl StageStyle {
    pub fn for_stage(stage: &DealStage) -> Self {
        match stage {
            DealStage::Lead => Self::Purple,
            DealStage::Qualified => Self::Blue,
            DealStage::Proposal => Self::Amber,
            DealStage::Negotiation => Self::Orange,
            DealStage::ClosedWon => Self::Green,
            DealStage::ClosedLost => Self::Red,
            DealStage::Other(_) => Self::Gray,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Purple => "border-purple-500",
            Self::Blue => "border-blue-500",
            Self::Amber => "border-amber-500",
            Self::Orange => "border-orange-500",
            Self::Green => "border-green-500",
            Self::Red => "border-red-500",
            Self::Gray => "border-gray-300",
        }
    }
}

/// Deals sharing one stage, with their summed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBucket {
    pub name: String,
    pub stage: DealStage,
    pub style: StageStyle,
    pub deals: Vec<Deal>,
    pub total_value: f64,
}

impl StageBucket {
    fn empty(name: &str) -> Self {
        let stage = DealStage::parse(name);
        Self {
            name: name.to_string(),
            style: StageStyle::for_stage(&stage),
            stage,
            deals: Vec::new(),
            total_value: 0.0,
        }
    }

    fn push(&mut self, deal: &Deal) {
        self.total_value += deal.value;
        self.deals.push(deal.clone());
    }

    pub fn deal_count(&self) -> usize {
        self.deals.len()
    }
}

/// Deals whose stage is `stage_name`, in input order.
pub fn group_deals_by_stage(deals: &[Deal], stage_name: &str) -> StageBucket {
    let mut bucket = StageBucket::empty(stage_name);
    let wanted = bucket.stage.clone();
    for deal in deals.iter().filter(|d| d.stage == wanted) {
        bucket.push(deal);
    }
    bucket
}

/// One bucket per stage in `order`, filled in a single pass over `deals`.
///
/// Deals whose stage has no bucket are left out. A stage listed twice gets
/// one bucket at its first position.
pub fn build_stage_buckets(stages: &[Stage], deals: &[Deal]) -> Vec<StageBucket> {
    let mut ordered: Vec<&Stage> = stages.iter().collect();
    ordered.sort_by_key(|s| s.order);

    let mut buckets: Vec<StageBucket> = Vec::with_capacity(ordered.len());
    let mut index: HashMap<DealStage, usize> = HashMap::with_capacity(ordered.len());
    for stage in ordered {
        let bucket = StageBucket::empty(&stage.name);
        if index.contains_key(&bucket.stage) {
            continue;
        }
        index.insert(bucket.stage.clone(), buckets.len());
        buckets.push(bucket);
    }

    for deal in deals {
        if let Some(&slot) = index.get(&deal.stage) {
            buckets[slot].push(deal);
        }
    }
    buckets
}
