/// Page controller tests
///
/// Contacts, deals and dashboard pages over the in-memory record service:
/// joined loads, retry, unmount and list interaction.
/// Run with: cargo test --test page_tests
use std::sync::Arc;

use dealflow::normalize::RawRecord;
use dealflow::page::CONTACT_SEARCH_FIELDS;
use dealflow::{
    ContactPatch, ContactsPage, Crm, CrmConfig, DealPatch, DealStage, DealsPage, FaultMode,
    LoadState, MemoryRecordStore, NotificationLevel, PageScope, SortOrder,
};
use serde_json::json;

async fn seeded() -> (Arc<MemoryRecordStore>, Crm) {
    let store = Arc::new(MemoryRecordStore::new());
    store
        .seed_json(
            "contact_c",
            r#"[
                {"Id": 1, "name_c": "Ann Lee", "email_c": "ann@acme.io", "company_c": "Acme"},
                {"Id": 2, "name_c": "Bob Stone", "email_c": "bob@globex.com", "company_c": "Globex"}
            ]"#,
        )
        .await
        .unwrap();
    store
        .seed(
            "deal_c",
            vec![
                RawRecord::from_value(json!({"Id": 10, "title_c": "Renewal", "value_c": 500, "stage_c": "Lead", "contact_id_c": 1})),
                RawRecord::from_value(json!({"Id": 11, "title_c": "Upsell", "value_c": 300, "stage_c": "Closed Won", "contact_id_c": 1})),
                RawRecord::from_value(json!({"Id": 12, "title_c": "Pilot", "value_c": 900, "stage_c": "Proposal", "contact_id_c": 2})),
            ],
        )
        .await;
    store
        .seed(
            "activity_c",
            vec![
                RawRecord::from_value(json!({"Id": 1, "type_c": "call", "description_c": "Intro", "timestamp_c": "2025-01-02T10:00:00Z"})),
                RawRecord::from_value(json!({"Id": 2, "type_c": "email", "description_c": "Follow-up", "timestamp_c": "2025-01-05T10:00:00Z"})),
            ],
        )
        .await;
    let crm = Crm::with_store(store.clone(), CrmConfig::default()).unwrap();
    (store, crm)
}

#[tokio::test]
async fn test_contacts_page_rows() {
    let (_, crm) = seeded().await;
    let mut page = crm.contacts_page();
    assert!(page.state().is_loading());

    page.load().await;
    assert_eq!(page.state(), &LoadState::Ready);

    let rows = page.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].contact.name, "Ann Lee");
    assert_eq!(rows[0].total_deal_value, 800.0);
    assert_eq!(rows[0].active_deal_count, 1);
    assert_eq!(page.query().search_fields, CONTACT_SEARCH_FIELDS.map(String::from).to_vec());
}

#[tokio::test]
async fn test_contacts_page_search_and_sort() {
    let (_, crm) = seeded().await;
    let mut page = crm.contacts_page();
    page.load().await;

    page.set_search("GLOBEX");
    let rows = page.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].contact.id, 2);

    page.set_search("");
    page.toggle_sort("name");
    assert_eq!(page.sort().order, SortOrder::Desc);
    let names: Vec<String> = page.rows().into_iter().map(|r| r.contact.name).collect();
    assert_eq!(names, vec!["Bob Stone", "Ann Lee"]);

    page.toggle_sort("totalDealValue");
    assert_eq!(page.sort().order, SortOrder::Asc);
    let totals: Vec<f64> = page.rows().iter().map(|r| r.total_deal_value).collect();
    assert_eq!(totals, vec![800.0, 900.0]);
}

#[tokio::test]
async fn test_load_failure_and_retry() {
    let (store, crm) = seeded().await;
    store.set_fault(FaultMode::Offline).await;

    let mut contacts = crm.contacts_page();
    contacts.load().await;
    assert_eq!(contacts.state().error(), Some("Failed to load contacts"));
    assert!(contacts.rows().is_empty());

    let mut deals = crm.deals_page();
    deals.load().await;
    assert_eq!(deals.state().error(), Some("Failed to load deals"));

    let mut dashboard = crm.dashboard_page();
    dashboard.load().await;
    assert_eq!(dashboard.state().error(), Some("Failed to load dashboard data"));

    assert!(crm.notifications().is_empty());

    store.set_fault(FaultMode::Healthy).await;
    contacts.retry().await;
    assert!(contacts.state().is_ready());
    assert_eq!(contacts.rows().len(), 2);
}

#[tokio::test]
async fn test_unmounted_page_discards_results() {
    let (_, crm) = seeded().await;
    let scope = PageScope::new();
    let mut page = DealsPage::with_scope(crm.gateways(), scope.clone());

    scope.unmount();
    page.load().await;
    assert!(page.deals().is_empty());
    assert!(page.state().is_loading());

    let mut contacts = ContactsPage::with_scope(crm.gateways(), scope);
    let created = contacts.add_contact(&ContactPatch::new().name("Late")).await;
    assert!(created.is_some());
    assert!(contacts.contacts().is_empty());
}

#[tokio::test]
async fn test_deals_page_filters_by_stage() {
    let (_, crm) = seeded().await;
    let mut page = crm.deals_page();
    page.load().await;

    let ids: Vec<i64> = page.rows().iter().map(|r| r.deal.id).collect();
    assert_eq!(ids, vec![12, 10, 11]);

    page.set_stage_filter("Lead");
    let rows = page.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].contact_name, "Ann Lee");

    page.set_stage_filter("all");
    page.set_search("bob");
    let ids: Vec<i64> = page.rows().iter().map(|r| r.deal.id).collect();
    assert_eq!(ids, vec![12]);
}

#[tokio::test]
async fn test_quick_add_appends_server_record() {
    let (store, crm) = seeded().await;
    let mut contacts = crm.contacts_page();
    contacts.load().await;

    let created = contacts
        .add_contact(&ContactPatch::new().name("Cy").company("Initech"))
        .await
        .unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(contacts.contacts().len(), 3);

    let mut deals = crm.deals_page();
    deals.load().await;
    let deal = deals
        .add_deal(&DealPatch::new().title("Seats").value(150.0).stage(DealStage::Qualified).contact(3))
        .await
        .unwrap();
    assert_eq!(deal.contact_id, Some(3));
    assert_eq!(deals.deals().len(), 4);
    assert_eq!(store.row_count("deal_c").await, 4);

    let notes = crm.notifications().drain();
    let messages: Vec<&str> = notes.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["Contact added successfully!", "Deal added successfully!"]);
    assert!(notes.iter().all(|n| n.level == NotificationLevel::Success));
}

#[tokio::test]
async fn test_failed_quick_add_notifies_error_only() {
    let (store, crm) = seeded().await;
    let mut contacts = crm.contacts_page();
    contacts.load().await;
    store.set_fault(FaultMode::Reject("Email already in use".to_string())).await;

    assert!(contacts.add_contact(&ContactPatch::new().name("Dup")).await.is_none());
    assert_eq!(contacts.contacts().len(), 2);

    let notes = crm.notifications().drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Email already in use");
}

#[tokio::test]
async fn test_dashboard_view() {
    let (_, crm) = seeded().await;
    let mut page = crm.dashboard_page();
    page.load().await;
    assert!(page.state().is_ready());

    let view = page.view();
    assert_eq!(view.metrics.total_value, 1700.0);
    assert_eq!(view.metrics.active_deals, 2);
    assert_eq!(view.metrics.won_deals, 1);
    assert_eq!(view.metrics.conversion_rate, 33);
    assert_eq!(view.metrics.total_contacts, 2);
    assert_eq!(view.top_deals[0].id, 12);
    assert_eq!(view.recent_activities[0].description, "Follow-up");
}
