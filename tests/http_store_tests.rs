/// Record service over HTTP
///
/// Serves a `MemoryRecordStore` through the axum record service and drives
/// it with `HttpRecordStore`, so the wire envelopes are exercised end to end.
/// Run with: cargo test --test http_store_tests
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use dealflow::normalize::RawRecord;
use dealflow::web::{record_service, record_service_for_project};
use dealflow::{
    Crm, CrmConfig, CrmError, DealPatch, DealStage, FaultMode, HttpRecordStore, HttpStoreConfig,
    MemoryRecordStore, RecordStore,
};
use http::{Request, StatusCode};
use serde_json::{Value as JsonValue, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn seeded_store() -> Arc<MemoryRecordStore> {
    let store = Arc::new(MemoryRecordStore::new());
    store
        .seed(
            "deal_c",
            vec![
                RawRecord::from_value(json!({"Id": 1, "title_c": "Renewal", "value_c": 500, "stage_c": "Lead"})),
                RawRecord::from_value(json!({"Id": 2, "title_c": "Pilot", "value_c": 200, "stage_c": "Proposal"})),
            ],
        )
        .await;
    store
}

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn http_config(base_url: &str, project: &str) -> HttpStoreConfig {
    HttpStoreConfig::new(base_url, project).request_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_gateway_over_http() {
    let memory = seeded_store().await;
    let base_url = serve(record_service_for_project(memory.clone(), "crm")).await;

    let crm = Crm::connect(http_config(&base_url, "crm"), CrmConfig::default()).unwrap();
    let deals = crm.gateways().deals.get_all().await;
    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].title, "Renewal");

    let fetched = crm.gateways().deals.get_by_id("2").await.unwrap();
    assert_eq!(fetched.stage, DealStage::Proposal);
    assert!(crm.gateways().deals.get_by_id(99).await.is_none());

    let created = crm
        .gateways()
        .deals
        .create(&DealPatch::new().title("Seats").value(75.0))
        .await
        .unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(memory.row_count("deal_c").await, 3);

    let updated = crm
        .gateways()
        .deals
        .update(1, &DealPatch::new().stage(DealStage::Negotiation))
        .await
        .unwrap();
    assert_eq!(updated.stage, DealStage::Negotiation);
    assert_eq!(updated.value, 500.0);

    assert!(crm.gateways().deals.delete(2).await);
    assert_eq!(memory.row_count("deal_c").await, 2);
    assert!(crm.notifications().is_empty());
}

#[tokio::test]
async fn test_pipeline_board_over_http() {
    let memory = seeded_store().await;
    memory
        .seed_json("stage_c", r#"[{"name_c": "Lead", "order_c": 1}, {"name_c": "Proposal", "order_c": 2}]"#)
        .await
        .unwrap();
    let base_url = serve(record_service(memory.clone())).await;

    let crm = Crm::connect(http_config(&base_url, "crm"), CrmConfig::default()).unwrap();
    let mut board = crm.pipeline_board();
    board.load().await;
    assert!(board.state().is_ready());

    board.drag_start(1);
    assert!(board.drop_on("Proposal").await.is_moved());
    assert_eq!(board.buckets()[1].deal_count(), 2);

    let messages: Vec<String> = crm.notifications().drain().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, vec!["Deal moved to Proposal"]);
}

#[tokio::test]
async fn test_rejection_travels_as_success_false() {
    let memory = seeded_store().await;
    memory.set_fault(FaultMode::Reject("Quota exceeded".to_string())).await;
    let base_url = serve(record_service(memory)).await;

    let crm = Crm::connect(http_config(&base_url, "crm"), CrmConfig::default()).unwrap();
    assert!(crm.gateways().deals.get_all().await.is_empty());
    assert_eq!(crm.notifications().errors()[0].message, "Quota exceeded");
}

#[tokio::test]
async fn test_unknown_project_is_a_transport_failure() {
    let memory = seeded_store().await;
    let base_url = serve(record_service_for_project(memory, "crm")).await;

    let store = HttpRecordStore::new(http_config(&base_url, "other")).unwrap();
    let err = store
        .fetch_records("deal_c", &dealflow::store::FetchQuery::all())
        .await
        .unwrap_err();
    match err {
        CrmError::Transport(message) => assert!(message.starts_with("HTTP 404")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_notifies_generic_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let crm = Crm::connect(http_config(&format!("http://{}", addr), "crm"), CrmConfig::default()).unwrap();
    assert!(crm.gateways().contacts.get_all().await.is_empty());
    assert_eq!(crm.notifications().errors()[0].message, "Failed to load contacts");
}

// ============================================================================
// Router without a socket
// ============================================================================

async fn body_json(response: axum::response::Response) -> JsonValue {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_router_fetch_envelope() {
    let app = record_service(seeded_store().await);

    let request = Request::builder()
        .method("POST")
        .uri("/tables/deal_c/records/query")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"fields": [{"field": {"Name": "title_c"}}]}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"][0]["title_c"], json!("Renewal"));
    assert!(body["data"][0].get("value_c").is_none());
}

#[tokio::test]
async fn test_router_scopes_tables_to_project() {
    let app = record_service_for_project(seeded_store().await, "crm");

    let missing_header = Request::builder()
        .method("POST")
        .uri("/tables/deal_c/records/query")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(missing_header).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], json!("unknown_project"));

    let other_project = Request::builder()
        .method("POST")
        .uri("/tables/deal_c/records/query")
        .header("content-type", "application/json")
        .header("X-Project-Id", "other")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(other_project).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], json!("project 'other' not found"));

    let own_project = Request::builder()
        .method("POST")
        .uri("/tables/deal_c/records/query")
        .header("content-type", "application/json")
        .header("X-Project-Id", "crm")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(own_project).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], json!(true));
}

#[tokio::test]
async fn test_router_rejects_bad_record_id() {
    let app = record_service(seeded_store().await);

    let request = Request::builder()
        .method("POST")
        .uri("/tables/deal_c/records/abc/query")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
