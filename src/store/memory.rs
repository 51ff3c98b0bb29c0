use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use super::engine::{FetchQuery, RecordResult, RecordStore, StoreResponse};
use crate::core::{CrmError, RecordId, Result};
use crate::normalize::{ID_FIELD, RawRecord};

/// Simulated service behaviour, for exercising failure paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FaultMode {
    #[default]
    Healthy,
    /// Every call fails before reaching the service.
    Offline,
    /// Every call is answered with `success: false` and this message.
    Reject(String),
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<RawRecord>,
}

impl MemoryTable {
    fn next_id(&self) -> RecordId {
        self.rows.iter().filter_map(RawRecord::id).max().unwrap_or(0) + 1
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == Some(id))
    }
}

/// In-process stand-in for the hosted record service.
///
/// Ids are assigned as `max(Id) + 1`, updates merge into the stored row,
/// and unknown ids are reported per record rather than failing the batch.
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
    fault: RwLock<FaultMode>,
    latency: Option<Duration>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            fault: RwLock::new(FaultMode::Healthy),
            latency: None,
        }
    }

    /// Delay every call, like a remote round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace a table's rows. Rows without an id are numbered in order.
    pub async fn seed(&self, table: &str, rows: Vec<RawRecord>) {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        entry.rows.clear();
        for mut row in rows {
            if row.id().is_none() {
                let id = entry.next_id();
                row.insert(ID_FIELD, id);
            }
            entry.rows.push(row);
        }
    }

    /// Seed from a JSON array of objects.
    pub async fn seed_json(&self, table: &str, document: &str) -> Result<usize> {
        let value: JsonValue = serde_json::from_str(document)?;
        let rows = value
            .as_array()
            .ok_or_else(|| CrmError::InvalidRecord("Expected JSON array of objects".to_string()))?
            .iter()
            .cloned()
            .map(RawRecord::from_value)
            .collect::<Vec<_>>();
        let count = rows.len();
        self.seed(table, rows).await;
        Ok(count)
    }

    pub async fn set_fault(&self, mode: FaultMode) {
        *self.fault.write().await = mode;
    }

    pub async fn rows(&self, table: &str) -> Vec<RawRecord> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }

    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    /// Apply latency and fault injection. `Ok(Some(message))` means the
    /// call must be refused with that message.
    async fn before_call(&self, operation: &str, table: &str) -> Result<Option<String>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        debug!("memory store {} on '{}'", operation, table);
        match &*self.fault.read().await {
            FaultMode::Healthy => Ok(None),
            FaultMode::Offline => Err(CrmError::Transport(format!(
                "record service unreachable during {}",
                operation
            ))),
            FaultMode::Reject(message) => Ok(Some(message.clone())),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> Result<StoreResponse<Vec<RawRecord>>> {
        if let Some(message) = self.before_call("fetch", table).await? {
            return Ok(StoreResponse::failed(message));
        }
        let fields = query.field_names();
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|row| if fields.is_empty() { row.clone() } else { row.project(&fields) })
                    .collect()
            })
            .unwrap_or_default();
        Ok(StoreResponse::ok(rows))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<StoreResponse<RawRecord>> {
        if let Some(message) = self.before_call("get", table).await? {
            return Ok(StoreResponse::failed(message));
        }
        let fields = query.field_names();
        let tables = self.tables.read().await;
        let found = tables
            .get(table)
            .and_then(|t| t.position(id).map(|idx| &t.rows[idx]))
            .map(|row| if fields.is_empty() { row.clone() } else { row.project(&fields) });
        Ok(match found {
            Some(row) => StoreResponse::ok(row),
            None => StoreResponse::empty(),
        })
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>> {
        if let Some(message) = self.before_call("create", table).await? {
            return Ok(StoreResponse::failed(message));
        }
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(records.len());
        for mut record in records {
            record.remove(ID_FIELD);
            let id = entry.next_id();
            record.insert(ID_FIELD, id);
            entry.rows.push(record.clone());
            results.push(RecordResult::ok(record));
        }
        Ok(StoreResponse::batch(results))
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>> {
        if let Some(message) = self.before_call("update", table).await? {
            return Ok(StoreResponse::failed(message));
        }
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let position = record.id().and_then(|id| entry.position(id));
            match position {
                Some(idx) => {
                    let mut patch = record;
                    patch.remove(ID_FIELD);
                    let row = &mut entry.rows[idx];
                    row.merge(&patch);
                    results.push(RecordResult::ok(row.clone()));
                }
                None => results.push(RecordResult::failed("Record does not exist")),
            }
        }
        Ok(StoreResponse::batch(results))
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: Vec<RecordId>,
    ) -> Result<StoreResponse<JsonValue>> {
        if let Some(message) = self.before_call("delete", table).await? {
            return Ok(StoreResponse::failed(message));
        }
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            match entry.position(id) {
                Some(idx) => {
                    let removed = entry.rows.remove(idx);
                    results.push(RecordResult::ok(removed));
                }
                None => results.push(RecordResult::failed("Record does not exist")),
            }
        }
        Ok(StoreResponse::batch(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: JsonValue) -> RawRecord {
        RawRecord::from_value(value)
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let store = MemoryRecordStore::new();
        store.seed("deal_c", vec![raw(json!({"Id": 4, "title_c": "A"}))]).await;

        let response = store
            .create_records("deal_c", vec![raw(json!({"Id": 99, "title_c": "B"}))])
            .await
            .unwrap();
        let results = response.results.unwrap();
        assert_eq!(results[0].data.as_ref().and_then(RawRecord::id), Some(5));
        assert_eq!(store.row_count("deal_c").await, 2);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryRecordStore::new();
        store
            .seed("deal_c", vec![raw(json!({"Id": 1, "stage_c": "Lead", "value_c": 10}))])
            .await;

        let response = store
            .update_records("deal_c", vec![raw(json!({"Id": 1, "stage_c": "Proposal"}))])
            .await
            .unwrap();
        let updated = response.results.unwrap().remove(0).data.unwrap();
        assert_eq!(updated.get("stage_c"), Some(&json!("Proposal")));
        assert_eq!(updated.get("value_c"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn unknown_ids_fail_per_record() {
        let store = MemoryRecordStore::new();
        store.seed("deal_c", vec![raw(json!({"Id": 1}))]).await;

        let response = store.delete_records("deal_c", vec![1, 2]).await.unwrap();
        let results = response.results.unwrap();
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(store.row_count("deal_c").await, 0);
    }

    #[tokio::test]
    async fn fetch_projects_selected_fields() {
        let store = MemoryRecordStore::new();
        store
            .seed("contact_c", vec![raw(json!({"name_c": "Ann", "internal": 1}))])
            .await;

        let response = store
            .fetch_records("contact_c", &FetchQuery::fields(["name_c"]))
            .await
            .unwrap();
        let rows = response.data.unwrap();
        assert_eq!(rows[0].id(), Some(1));
        assert!(!rows[0].contains_key("internal"));
    }

    #[tokio::test]
    async fn fault_modes() {
        let store = MemoryRecordStore::new();
        store.set_fault(FaultMode::Offline).await;
        assert!(matches!(
            store.fetch_records("deal_c", &FetchQuery::all()).await,
            Err(CrmError::Transport(_))
        ));

        store.set_fault(FaultMode::Reject("Quota exceeded".to_string())).await;
        let response = store.fetch_records("deal_c", &FetchQuery::all()).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Quota exceeded"));
    }

    #[tokio::test]
    async fn seed_json_rejects_non_arrays() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.seed_json("stage_c", r#"[{"name":"Lead"},{"name":"Won"}]"#).await.unwrap(), 2);
        assert!(store.seed_json("stage_c", r#"{"name":"Lead"}"#).await.is_err());
    }
}
