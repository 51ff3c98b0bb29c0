use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Entity, EntityKind, put_field, put_timestamp};
use crate::core::{RecordId, Timestamp};
use crate::normalize::{FieldSpec, RawRecord};

pub mod fields {
    use crate::normalize::FieldSpec;

    pub const TITLE: FieldSpec = FieldSpec::labelled("title", "title_c");
    pub const VALUE: FieldSpec = FieldSpec::new("value", "value_c");
    pub const STAGE: FieldSpec = FieldSpec::new("stage", "stage_c");
    pub const PROBABILITY: FieldSpec = FieldSpec::new("probability", "probability_c");
    pub const EXPECTED_CLOSE_DATE: FieldSpec =
        FieldSpec::new("expectedCloseDate", "expected_close_date_c");
    pub const CONTACT_ID: FieldSpec = FieldSpec::new("contactId", "contact_id_c");
    pub const CREATED_AT: FieldSpec = FieldSpec::new("createdAt", "created_at_c");
    pub const UPDATED_AT: FieldSpec = FieldSpec::new("updatedAt", "updated_at_c");

    pub const ALL: [FieldSpec; 8] = [
        TITLE,
        VALUE,
        STAGE,
        PROBABILITY,
        EXPECTED_CLOSE_DATE,
        CONTACT_ID,
        CREATED_AT,
        UPDATED_AT,
    ];
}

/// Pipeline stage of a deal.
///
/// Unrecognized stage strings are kept as `Other` so a record is never
/// rejected for carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
    Other(String),
}

impl DealStage {
    pub const CANONICAL: [DealStage; 6] = [
        Self::Lead,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let folded: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "lead" => Self::Lead,
            "qualified" => Self::Qualified,
            "proposal" => Self::Proposal,
            "negotiation" => Self::Negotiation,
            "closedwon" => Self::ClosedWon,
            "closedlost" => Self::ClosedLost,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Lead => "Lead",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
            Self::Other(raw) => raw,
        }
    }

    /// Won or lost; closed deals no longer count as active.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Default for DealStage {
    fn default() -> Self {
        Self::Lead
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DealStage {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for DealStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DealStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: RecordId,
    pub title: String,
    pub value: f64,
    pub stage: DealStage,
    pub probability: u8,
    pub expected_close_date: Option<Timestamp>,
    pub contact_id: Option<RecordId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deal {
    pub fn is_active(&self) -> bool {
        !self.stage.is_closed()
    }
}

impl Entity for Deal {
    const KIND: EntityKind = EntityKind::Deal;
    type Patch = DealPatch;

    fn field_specs() -> &'static [FieldSpec] {
        &fields::ALL
    }

    fn from_record(raw: &RawRecord) -> Self {
        let created_at = raw.timestamp(&fields::CREATED_AT).unwrap_or_else(Utc::now);
        Self {
            id: raw.id().unwrap_or_default(),
            title: raw.text(&fields::TITLE),
            value: raw.number(&fields::VALUE).max(0.0),
            stage: raw
                .optional_text(&fields::STAGE)
                .map(|s| DealStage::parse(&s))
                .unwrap_or_default(),
            probability: raw.integer(&fields::PROBABILITY).clamp(0, 100) as u8,
            expected_close_date: raw.timestamp(&fields::EXPECTED_CLOSE_DATE),
            contact_id: raw.reference(&fields::CONTACT_ID),
            created_at,
            updated_at: raw.timestamp(&fields::UPDATED_AT).unwrap_or(created_at),
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn create_record(patch: &DealPatch, now: Timestamp) -> RawRecord {
        let mut record = Self::update_record(patch);
        if patch.stage.is_none() {
            put_field(&mut record, &fields::STAGE, Some(DealStage::Lead.as_str()));
        }
        put_timestamp(&mut record, &fields::CREATED_AT, Some(patch.created_at.unwrap_or(now)));
        put_timestamp(&mut record, &fields::UPDATED_AT, Some(patch.updated_at.unwrap_or(now)));
        record
    }

    fn update_record(patch: &DealPatch) -> RawRecord {
        let mut record = RawRecord::new();
        put_field(&mut record, &fields::TITLE, patch.title.clone());
        put_field(&mut record, &fields::VALUE, patch.value.map(|v| v.max(0.0)));
        put_field(&mut record, &fields::STAGE, patch.stage.as_ref().map(|s| s.as_str().to_string()));
        put_field(&mut record, &fields::PROBABILITY, patch.probability.map(|p| p.min(100)));
        put_timestamp(&mut record, &fields::EXPECTED_CLOSE_DATE, patch.expected_close_date);
        put_field(
            &mut record,
            &fields::CONTACT_ID,
            patch.contact_id.map(|id| id.unwrap_or(0)),
        );
        put_timestamp(&mut record, &fields::CREATED_AT, patch.created_at);
        put_timestamp(&mut record, &fields::UPDATED_AT, patch.updated_at);
        record
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealPatch {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<Timestamp>,
    /// `Some(None)` clears the contact link.
    pub contact_id: Option<Option<RecordId>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl DealPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn stage(mut self, stage: DealStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn probability(mut self, probability: u8) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn expected_close_date(mut self, at: Timestamp) -> Self {
        self.expected_close_date = Some(at);
        self
    }

    pub fn contact(mut self, contact_id: RecordId) -> Self {
        self.contact_id = Some((contact_id > 0).then_some(contact_id));
        self
    }

    pub fn updated_at(mut self, at: Timestamp) -> Self {
        self.updated_at = Some(at);
        self
    }
}
