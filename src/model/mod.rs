//! Typed CRM records.
//!
//! Each entity knows how to read itself from a [`RawRecord`] (applying the
//! field precedence exactly once) and how to write a patch back in the
//! service's storage spelling.

pub mod activity;
pub mod contact;
pub mod deal;
pub mod stage;

pub use activity::{Activity, ActivityPatch, ActivityType};
pub use contact::{Contact, ContactPatch, EnrichedContact};
pub use deal::{Deal, DealPatch, DealStage};
pub use stage::{Stage, StagePatch};

use serde_json::Value as JsonValue;

use crate::core::{RecordId, Timestamp};
use crate::normalize::{FieldSpec, LABEL_FIELD, RawRecord};

/// The four record types the service stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contact,
    Deal,
    Stage,
    Activity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Contact, Self::Deal, Self::Stage, Self::Activity];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Deal => "deal",
            Self::Stage => "stage",
            Self::Activity => "activity",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Deal => "deals",
            Self::Stage => "stages",
            Self::Activity => "activities",
        }
    }

    pub fn default_table(&self) -> &'static str {
        match self {
            Self::Contact => "contact_c",
            Self::Deal => "deal_c",
            Self::Stage => "stage_c",
            Self::Activity => "activity_c",
        }
    }
}

/// A record type the gateway can move across the service boundary.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Partial field set used for both create and update.
    type Patch: Clone + Default + Send + Sync;

    /// Every logical field read from the service.
    fn field_specs() -> &'static [FieldSpec];

    fn from_record(raw: &RawRecord) -> Self;

    fn id(&self) -> RecordId;

    /// Wire record for a create; fills creation defaults from `now`.
    fn create_record(patch: &Self::Patch, now: Timestamp) -> RawRecord;

    /// Wire record for an update; only fields present in `patch` are sent.
    fn update_record(patch: &Self::Patch) -> RawRecord;

    /// Canonical name of the field the generic `Name` column mirrors.
    fn label_field() -> Option<&'static str> {
        Self::field_specs().iter().find(|spec| spec.label).map(|spec| spec.legacy)
    }

    /// Field selection for fetches: every accepted spelling of every field.
    fn select_fields() -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for spec in Self::field_specs() {
            for key in spec.candidates() {
                if !fields.iter().any(|f| f == key) {
                    fields.push(key.to_string());
                }
            }
        }
        fields
    }
}

/// Write `value` under the field's storage spelling, mirroring labelled
/// fields into the generic `Name` column. `None` leaves the record alone.
pub(crate) fn put_field<T: Into<JsonValue>>(record: &mut RawRecord, spec: &FieldSpec, value: Option<T>) {
    let Some(value) = value else {
        return;
    };
    let value = value.into();
    if spec.label {
        record.insert(LABEL_FIELD, value.clone());
    }
    record.insert(spec.stored, value);
}

pub(crate) fn put_timestamp(record: &mut RawRecord, spec: &FieldSpec, value: Option<Timestamp>) {
    put_field(record, spec, value.map(|ts| ts.to_rfc3339()));
}
