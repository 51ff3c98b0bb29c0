use std::collections::HashMap;

use serde::Serialize;

use crate::core::RecordId;
use crate::model::{Contact, Deal};

/// Shown for deals whose contact is unset or no longer exists.
pub const UNKNOWN_CONTACT: &str = "Unknown Contact";

/// A deal joined with its contact's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRow {
    #[serde(flatten)]
    pub deal: Deal,
    pub contact_name: String,
}

pub fn contact_name(contacts: &[Contact], contact_id: Option<RecordId>) -> String {
    contact_id
        .and_then(|id| contacts.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_CONTACT.to_string())
}

pub fn build_deal_rows(deals: &[Deal], contacts: &[Contact]) -> Vec<DealRow> {
    let names: HashMap<RecordId, &str> = contacts.iter().map(|c| (c.id, c.name.as_str())).collect();
    deals
        .iter()
        .map(|deal| DealRow {
            contact_name: deal
                .contact_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or(UNKNOWN_CONTACT)
                .to_string(),
            deal: deal.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::normalize::RawRecord;
    use serde_json::json;

    #[test]
    fn dangling_and_unset_contacts() {
        let contacts = vec![Contact::from_record(&RawRecord::from_value(json!({"Id": 1, "Name": "Ann"})))];
        let deals: Vec<Deal> = [json!({"Id": 1, "contact_id_c": 1}), json!({"Id": 2, "contact_id_c": 9}), json!({"Id": 3})]
            .into_iter()
            .map(|v| Deal::from_record(&RawRecord::from_value(v)))
            .collect();

        let names: Vec<String> = build_deal_rows(&deals, &contacts).into_iter().map(|r| r.contact_name).collect();
        assert_eq!(names, vec!["Ann", UNKNOWN_CONTACT, UNKNOWN_CONTACT]);
        assert_eq!(contact_name(&contacts, Some(1)), "Ann");
        assert_eq!(contact_name(&contacts, None), UNKNOWN_CONTACT);
    }

    #[test]
    fn row_serializes_flat() {
        let deal = Deal::from_record(&RawRecord::from_value(json!({"Id": 4, "title_c": "Pilot"})));
        let row = DealRow { deal, contact_name: "Ann".to_string() };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["title"], json!("Pilot"));
        assert_eq!(value["contactName"], json!("Ann"));
    }
}
