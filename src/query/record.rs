use crate::core::{FieldValue, Timestamp, earliest};
use crate::model::{Activity, Contact, Deal, DealStage, EnrichedContact, Entity, Stage};
use crate::normalize::{LABEL_FIELD, canonical_field_name};
use crate::view::DealRow;

/// A record the filter/sort engine can read fields from.
///
/// `field` receives the canonical camelCase name. Known fields never come
/// back `Null`: missing numbers read as 0, missing dates as the earliest
/// instant, missing text as "". Unknown fields are `Null`.
pub trait Queryable {
    fn field(&self, name: &str) -> FieldValue;

    /// Pipeline stage, for records that have one.
    fn stage(&self) -> Option<&DealStage> {
        None
    }

    /// Canonical field behind the generic `Name` column.
    fn label_field(&self) -> &'static str {
        "name"
    }
}

/// Read `field` under any accepted spelling (`title_c`, `Name`, `title`).
/// `Name` resolves to whichever field the record type labels with it.
pub fn field_value<R: Queryable + ?Sized>(record: &R, field: &str) -> FieldValue {
    if field.trim() == LABEL_FIELD {
        return record.field(record.label_field());
    }
    record.field(&canonical_field_name(field))
}

fn label_of<E: Entity>() -> &'static str {
    E::label_field().unwrap_or("name")
}

fn date(value: Option<Timestamp>) -> FieldValue {
    FieldValue::Timestamp(value.unwrap_or_else(earliest))
}

fn reference(value: Option<i64>) -> FieldValue {
    FieldValue::from(value.unwrap_or(0))
}

impl Queryable for Contact {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "company" => self.company.as_str().into(),
            "role" => self.role.as_str().into(),
            "createdAt" => self.created_at.into(),
            "lastContactDate" => date(self.last_contact_date),
            _ => FieldValue::Null,
        }
    }

    fn label_field(&self) -> &'static str {
        label_of::<Contact>()
    }
}

impl Queryable for EnrichedContact {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "activeDealCount" | "activeDeals" => self.active_deal_count.into(),
            "totalDealValue" | "totalValue" => self.total_deal_value.into(),
            other => self.contact.field(other),
        }
    }

    fn label_field(&self) -> &'static str {
        self.contact.label_field()
    }
}

impl Queryable for Deal {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.into(),
            "title" => self.title.as_str().into(),
            "value" => self.value.into(),
            "stage" => self.stage.as_str().into(),
            "probability" => i64::from(self.probability).into(),
            "expectedCloseDate" => date(self.expected_close_date),
            "contactId" => reference(self.contact_id),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => FieldValue::Null,
        }
    }

    fn stage(&self) -> Option<&DealStage> {
        Some(&self.stage)
    }

    fn label_field(&self) -> &'static str {
        label_of::<Deal>()
    }
}

impl Queryable for DealRow {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "contactName" => self.contact_name.as_str().into(),
            other => self.deal.field(other),
        }
    }

    fn stage(&self) -> Option<&DealStage> {
        Some(&self.deal.stage)
    }

    fn label_field(&self) -> &'static str {
        self.deal.label_field()
    }
}

impl Queryable for Activity {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.into(),
            "contactId" => reference(self.contact_id),
            "dealId" => reference(self.deal_id),
            "type" => self.kind.as_str().into(),
            "description" => self.description.as_str().into(),
            "timestamp" => date(self.timestamp),
            _ => FieldValue::Null,
        }
    }

    fn label_field(&self) -> &'static str {
        label_of::<Activity>()
    }
}

impl Queryable for Stage {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "order" => self.order.into(),
            "dealCount" => i64::try_from(self.deal_count.unwrap_or(0))
                .unwrap_or(i64::MAX)
                .into(),
            "totalValue" => self.total_value.unwrap_or(0.0).into(),
            _ => FieldValue::Null,
        }
    }

    fn label_field(&self) -> &'static str {
        label_of::<Stage>()
    }
}
