use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, put_field, put_timestamp};
use crate::core::{RecordId, Timestamp};
use crate::normalize::{FieldSpec, RawRecord};

pub mod fields {
    use crate::normalize::FieldSpec;

    pub const NAME: FieldSpec = FieldSpec::labelled("name", "name_c");
    pub const EMAIL: FieldSpec = FieldSpec::new("email", "email_c");
    pub const PHONE: FieldSpec = FieldSpec::new("phone", "phone_c");
    pub const COMPANY: FieldSpec = FieldSpec::new("company", "company_c");
    pub const ROLE: FieldSpec = FieldSpec::new("role", "role_c");
    pub const CREATED_AT: FieldSpec = FieldSpec::new("createdAt", "created_at_c");
    pub const LAST_CONTACT_DATE: FieldSpec =
        FieldSpec::new("lastContactDate", "last_contact_date_c");

    pub const ALL: [FieldSpec; 7] = [
        NAME,
        EMAIL,
        PHONE,
        COMPANY,
        ROLE,
        CREATED_AT,
        LAST_CONTACT_DATE,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub role: String,
    pub created_at: Timestamp,
    pub last_contact_date: Option<Timestamp>,
}

impl Entity for Contact {
    const KIND: EntityKind = EntityKind::Contact;
    type Patch = ContactPatch;

    fn field_specs() -> &'static [FieldSpec] {
        &fields::ALL
    }

    fn from_record(raw: &RawRecord) -> Self {
        Self {
            id: raw.id().unwrap_or_default(),
            name: raw.text(&fields::NAME),
            email: raw.text(&fields::EMAIL),
            phone: raw.text(&fields::PHONE),
            company: raw.text(&fields::COMPANY),
            role: raw.text(&fields::ROLE),
            created_at: raw.timestamp(&fields::CREATED_AT).unwrap_or_else(Utc::now),
            last_contact_date: raw.timestamp(&fields::LAST_CONTACT_DATE),
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn create_record(patch: &ContactPatch, now: Timestamp) -> RawRecord {
        let mut record = Self::update_record(patch);
        put_timestamp(&mut record, &fields::CREATED_AT, Some(patch.created_at.unwrap_or(now)));
        put_timestamp(
            &mut record,
            &fields::LAST_CONTACT_DATE,
            Some(patch.last_contact_date.unwrap_or(now)),
        );
        record
    }

    fn update_record(patch: &ContactPatch) -> RawRecord {
        let mut record = RawRecord::new();
        put_field(&mut record, &fields::NAME, patch.name.clone());
        put_field(&mut record, &fields::EMAIL, patch.email.clone());
        put_field(&mut record, &fields::PHONE, patch.phone.clone());
        put_field(&mut record, &fields::COMPANY, patch.company.clone());
        put_field(&mut record, &fields::ROLE, patch.role.clone());
        put_timestamp(&mut record, &fields::CREATED_AT, patch.created_at);
        put_timestamp(&mut record, &fields::LAST_CONTACT_DATE, patch.last_contact_date);
        record
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<Timestamp>,
    pub last_contact_date: Option<Timestamp>,
}

impl ContactPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn last_contact_date(mut self, at: Timestamp) -> Self {
        self.last_contact_date = Some(at);
        self
    }
}

/// A contact joined with the deals that reference it. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedContact {
    #[serde(flatten)]
    pub contact: Contact,
    /// Deals referencing this contact that are still open.
    pub active_deal_count: usize,
    /// Sum over every deal referencing this contact, closed ones included.
    pub total_deal_value: f64,
}
