use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Entity, EntityKind, put_field, put_timestamp};
use crate::core::{RecordId, Timestamp};
use crate::normalize::{FieldSpec, RawRecord};

pub mod fields {
    use crate::normalize::FieldSpec;

    pub const CONTACT_ID: FieldSpec = FieldSpec::new("contactId", "contact_id_c");
    pub const DEAL_ID: FieldSpec = FieldSpec::new("dealId", "deal_id_c");
    pub const TYPE: FieldSpec = FieldSpec::new("type", "type_c");
    pub const DESCRIPTION: FieldSpec = FieldSpec::labelled("description", "description_c");
    pub const TIMESTAMP: FieldSpec = FieldSpec::new("timestamp", "timestamp_c");

    pub const ALL: [FieldSpec; 5] = [CONTACT_ID, DEAL_ID, TYPE, DESCRIPTION, TIMESTAMP];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    Note,
    Other(String),
}

impl ActivityType {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "call" => Self::Call,
            "email" => Self::Email,
            "meeting" => Self::Meeting,
            "note" => Self::Note,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Note => "note",
            Self::Other(raw) => raw,
        }
    }

    /// Icon name used by the activity feed.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Call => "Phone",
            Self::Email => "Mail",
            Self::Meeting => "Calendar",
            Self::Note => "FileText",
            Self::Other(_) => "Activity",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: RecordId,
    pub contact_id: Option<RecordId>,
    pub deal_id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: String,
    pub timestamp: Option<Timestamp>,
}

impl Entity for Activity {
    const KIND: EntityKind = EntityKind::Activity;
    type Patch = ActivityPatch;

    fn field_specs() -> &'static [FieldSpec] {
        &fields::ALL
    }

    fn from_record(raw: &RawRecord) -> Self {
        Self {
            id: raw.id().unwrap_or_default(),
            contact_id: raw.reference(&fields::CONTACT_ID),
            deal_id: raw.reference(&fields::DEAL_ID),
            kind: ActivityType::parse(&raw.text(&fields::TYPE)),
            description: raw.text(&fields::DESCRIPTION),
            timestamp: raw.timestamp(&fields::TIMESTAMP),
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn create_record(patch: &ActivityPatch, now: Timestamp) -> RawRecord {
        let mut record = Self::update_record(patch);
        put_timestamp(&mut record, &fields::TIMESTAMP, Some(patch.timestamp.unwrap_or(now)));
        record
    }

    fn update_record(patch: &ActivityPatch) -> RawRecord {
        let mut record = RawRecord::new();
        put_field(&mut record, &fields::CONTACT_ID, patch.contact_id);
        put_field(&mut record, &fields::DEAL_ID, patch.deal_id);
        put_field(&mut record, &fields::TYPE, patch.kind.as_ref().map(|k| k.as_str().to_string()));
        put_field(&mut record, &fields::DESCRIPTION, patch.description.clone());
        put_timestamp(&mut record, &fields::TIMESTAMP, patch.timestamp);
        record
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPatch {
    pub contact_id: Option<RecordId>,
    pub deal_id: Option<RecordId>,
    pub kind: Option<ActivityType>,
    pub description: Option<String>,
    pub timestamp: Option<Timestamp>,
}

impl ActivityPatch {
    pub fn new(kind: ActivityType, description: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn contact(mut self, contact_id: RecordId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn deal(mut self, deal_id: RecordId) -> Self {
        self.deal_id = Some(deal_id);
        self
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
