/// Record gateway tests
///
/// CRUD through `Gateway<E>` against the in-memory record service, including
/// failure surfacing through the notification side channel.
/// Run with: cargo test --test gateway_tests
use std::sync::Arc;

use async_trait::async_trait;
use dealflow::core::RecordId;
use dealflow::normalize::RawRecord;
use dealflow::store::{FetchQuery, RecordResult, StoreResponse};
use dealflow::{
    Contact, ContactPatch, CrmConfig, CrmError, DealPatch, DealStage, FaultMode, Gateway,
    Gateways, LogNotifier, MemoryRecordStore, NotificationCenter, RecordStore,
};
use serde_json::{Value as JsonValue, json};

fn raw(value: JsonValue) -> RawRecord {
    RawRecord::from_value(value)
}

async fn setup() -> (Arc<MemoryRecordStore>, NotificationCenter, Gateways) {
    let store = Arc::new(MemoryRecordStore::new());
    store
        .seed(
            "contact_c",
            vec![
                raw(json!({"Id": 1, "name_c": "Ann Lee", "email_c": "ann@acme.io", "company_c": "Acme"})),
                raw(json!({"Id": 2, "name": "Bob Stone", "email": "bob@globex.com"})),
                raw(json!({"Id": 3, "Name": "Cy Twombly"})),
            ],
        )
        .await;
    store
        .seed(
            "deal_c",
            vec![
                raw(json!({"Id": 10, "title_c": "Renewal", "value_c": 500, "stage_c": "Lead", "contact_id_c": 1})),
                raw(json!({"Id": 11, "title": "Upsell", "value": "300", "stage": "Closed Won", "contactId": "1"})),
            ],
        )
        .await;
    let notifications = NotificationCenter::default();
    let gateways = Gateways::new(store.clone(), Arc::new(notifications.clone()), &CrmConfig::default());
    (store, notifications, gateways)
}

#[tokio::test]
async fn test_get_all_resolves_field_variants() {
    let (_, notifications, gateways) = setup().await;

    let contacts = gateways.contacts.get_all().await;
    let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ann Lee", "Bob Stone", "Cy Twombly"]);
    assert_eq!(contacts[1].email, "bob@globex.com");
    assert_eq!(contacts[2].email, "");

    let deals = gateways.deals.get_all().await;
    assert_eq!(deals[1].value, 300.0);
    assert_eq!(deals[1].stage, DealStage::ClosedWon);
    assert_eq!(deals[1].contact_id, Some(1));
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_get_by_id_coerces_ids() {
    let (_, notifications, gateways) = setup().await;

    let by_string = gateways.contacts.get_by_id("2").await.unwrap();
    let by_number = gateways.contacts.get_by_id(2).await.unwrap();
    assert_eq!(by_string.id, 2);
    assert_eq!(by_string.name, by_number.name);

    assert!(gateways.contacts.get_by_id(99).await.is_none());
    assert!(gateways.contacts.get_by_id("not-an-id").await.is_none());
    assert!(notifications.is_empty());

    let err = gateways.contacts.try_get_by_id(99).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_returns_server_record() {
    let (store, _, gateways) = setup().await;

    let created = gateways
        .contacts
        .create(&ContactPatch::new().name("Dee").email("dee@initech.com"))
        .await
        .unwrap();
    assert_eq!(created.id, 4);
    assert_eq!(created.name, "Dee");
    assert!(created.last_contact_date.is_some());

    let rows = store.rows("contact_c").await;
    let stored = rows.iter().find(|r| r.id() == Some(4)).unwrap();
    assert_eq!(stored.get("Name"), Some(&json!("Dee")));
    assert_eq!(stored.get("name_c"), Some(&json!("Dee")));
}

#[tokio::test]
async fn test_update_merges_partial_patch() {
    let (_, notifications, gateways) = setup().await;

    let updated = gateways
        .deals
        .update("10", &DealPatch::new().stage(DealStage::Proposal))
        .await
        .unwrap();
    assert_eq!(updated.stage, DealStage::Proposal);
    assert_eq!(updated.title, "Renewal");
    assert_eq!(updated.value, 500.0);
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_update_unknown_id_reports_each_failure() {
    let (_, notifications, gateways) = setup().await;

    let result = gateways.deals.update(404, &DealPatch::new().value(1.0)).await;
    assert!(result.is_none());

    let errors = notifications.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Record does not exist");
}

#[tokio::test]
async fn test_delete() {
    let (store, notifications, gateways) = setup().await;

    assert!(gateways.contacts.delete(3).await);
    assert_eq!(store.row_count("contact_c").await, 2);

    assert!(!gateways.contacts.delete(3).await);
    assert_eq!(notifications.errors().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_swallowed_and_notified() {
    let (store, notifications, gateways) = setup().await;
    store.set_fault(FaultMode::Offline).await;

    assert!(gateways.contacts.get_all().await.is_empty());
    assert!(gateways.deals.get_by_id(10).await.is_none());
    assert!(gateways.deals.create(&DealPatch::new().title("x")).await.is_none());

    let messages: Vec<String> = notifications.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec!["Failed to load contacts", "Failed to load deal", "Failed to create deal"]
    );
}

#[tokio::test]
async fn test_rejection_message_is_shown_verbatim() {
    let (store, notifications, gateways) = setup().await;
    store.set_fault(FaultMode::Reject("Quota exceeded".to_string())).await;

    assert!(gateways.stages.get_all().await.is_empty());
    assert_eq!(notifications.errors()[0].message, "Quota exceeded");
}

#[tokio::test]
async fn test_try_operations_stay_silent() {
    let (store, notifications, gateways) = setup().await;
    store.set_fault(FaultMode::Offline).await;

    let err = gateways.deals.try_update(10, &DealPatch::new().value(1.0)).await.unwrap_err();
    assert!(matches!(err, CrmError::Transport(_)));
    assert!(gateways.contacts.try_get_all().await.is_err());
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_detached_gateway_is_not_initialized() {
    let notifications = NotificationCenter::default();
    let gateways = Gateways::detached(Arc::new(notifications.clone()), &CrmConfig::default());

    assert!(matches!(gateways.deals.try_get_all().await, Err(CrmError::NotInitialized)));
    assert!(gateways.deals.get_all().await.is_empty());
    assert_eq!(notifications.errors()[0].message, "Failed to load deals");
}

#[tokio::test]
async fn test_log_notifier_gateway_degrades_quietly() {
    let (store, _, _) = setup().await;
    let gateways = Gateways::new(store.clone(), Arc::new(LogNotifier), &CrmConfig::default());

    assert_eq!(gateways.contacts.get_all().await.len(), 3);

    store.set_fault(FaultMode::Offline).await;
    assert!(gateways.contacts.get_all().await.is_empty());
    assert!(!gateways.deals.delete(10).await);
}

// ============================================================================
// Partial batch failure
// ============================================================================

/// Answers every write with one refused record followed by one accepted.
struct HalfAcceptingStore;

#[async_trait]
impl RecordStore for HalfAcceptingStore {
    async fn fetch_records(&self, _: &str, _: &FetchQuery) -> dealflow::Result<StoreResponse<Vec<RawRecord>>> {
        Ok(StoreResponse::ok(Vec::new()))
    }

    async fn get_record_by_id(&self, _: &str, _: RecordId, _: &FetchQuery) -> dealflow::Result<StoreResponse<RawRecord>> {
        Ok(StoreResponse::empty())
    }

    async fn create_records(&self, _: &str, records: Vec<RawRecord>) -> dealflow::Result<StoreResponse<RawRecord>> {
        let accepted = records.into_iter().next().unwrap_or_default().with("Id", 42);
        Ok(StoreResponse::batch(vec![
            RecordResult::failed("Invalid email"),
            RecordResult::ok(accepted),
        ]))
    }

    async fn update_records(&self, _: &str, _: Vec<RawRecord>) -> dealflow::Result<StoreResponse<RawRecord>> {
        Ok(StoreResponse::batch(vec![
            RecordResult::failed("Name is required"),
            RecordResult::failed("Phone is invalid"),
        ]))
    }

    async fn delete_records(&self, _: &str, _: Vec<RecordId>) -> dealflow::Result<StoreResponse<JsonValue>> {
        Ok(StoreResponse::batch(Vec::new()))
    }
}

#[tokio::test]
async fn test_partial_batch_returns_first_success() {
    let notifications = NotificationCenter::default();
    let gateway: Gateway<Contact> =
        Gateway::new(Arc::new(HalfAcceptingStore), Arc::new(notifications.clone()), "contact_c");

    let created = gateway.create(&ContactPatch::new().name("Eve")).await.unwrap();
    assert_eq!(created.id, 42);
    assert_eq!(created.name, "Eve");

    let errors = notifications.drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Invalid email");
}

#[tokio::test]
async fn test_fully_refused_batch_reports_every_record() {
    let notifications = NotificationCenter::default();
    let gateway: Gateway<Contact> =
        Gateway::new(Arc::new(HalfAcceptingStore), Arc::new(notifications.clone()), "contact_c");

    assert!(gateway.update(1, &ContactPatch::new().name("")).await.is_none());
    let messages: Vec<String> = notifications.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, vec!["Name is required", "Phone is invalid"]);

    let err = gateway.try_update(1, &ContactPatch::new()).await.unwrap_err();
    assert!(matches!(err, CrmError::BatchRejected { failed: 2, .. }));
    assert!(notifications.is_empty());
}
