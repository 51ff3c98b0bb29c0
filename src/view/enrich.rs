use std::collections::HashMap;

use crate::core::RecordId;
use crate::model::{Contact, Deal, EnrichedContact};

#[derive(Debug, Default, Clone, Copy)]
struct DealTotals {
    active: usize,
    value: f64,
}

/// Join contacts with the deals that reference them.
///
/// `active_deal_count` skips won and lost deals; `total_deal_value` counts
/// every referencing deal. Deals are indexed once, so this is linear in
/// contacts plus deals.
pub fn enrich_contacts(contacts: &[Contact], deals: &[Deal]) -> Vec<EnrichedContact> {
    let mut totals: HashMap<RecordId, DealTotals> = HashMap::with_capacity(contacts.len());
    for deal in deals {
        let Some(contact_id) = deal.contact_id else {
            continue;
        };
        let entry = totals.entry(contact_id).or_default();
        entry.value += deal.value;
        if deal.is_active() {
            entry.active += 1;
        }
    }

    contacts
        .iter()
        .map(|contact| {
            let DealTotals { active, value } = totals.get(&contact.id).copied().unwrap_or_default();
            EnrichedContact {
                contact: contact.clone(),
                active_deal_count: active,
                total_deal_value: value,
            }
        })
        .collect()
}
