use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::{RecordId, Result};
use crate::normalize::RawRecord;

/// `{"field": {"Name": "<column>"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Field selection for a fetch. An empty selection returns every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    #[serde(default)]
    pub fields: Vec<FieldSelector>,
}

impl FetchQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|name| FieldSelector {
                    field: FieldName { name: name.into() },
                })
                .collect(),
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.field.name.clone()).collect()
    }
}

/// Outcome for one record of a batched write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn ok(data: RawRecord) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Envelope every record service call answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
}

impl<T> StoreResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            results: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            results: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            results: None,
        }
    }

    pub fn batch(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            results: Some(results),
        }
    }
}

/// Write payload: `{"records": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<RawRecord>,
}

/// Delete payload: `{"RecordIds": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

/// The hosted record service, seen from this crate.
///
/// `Err` means the call never produced an answer (transport failure);
/// an answer with `success: false` is an explicit refusal.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_records(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> Result<StoreResponse<Vec<RawRecord>>>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<StoreResponse<RawRecord>>;

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>>;

    /// Each record must carry its `Id`; other fields are merged over the
    /// stored record.
    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>>;

    async fn delete_records(
        &self,
        table: &str,
        ids: Vec<RecordId>,
    ) -> Result<StoreResponse<JsonValue>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fetch_query_wire_shape() {
        let query = FetchQuery::fields(["Name", "email_c"]);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({"fields": [{"field": {"Name": "Name"}}, {"field": {"Name": "email_c"}}]})
        );
        assert_eq!(query.field_names(), vec!["Name", "email_c"]);
    }

    #[test]
    fn response_tolerates_missing_members() {
        let parsed: StoreResponse<Vec<RawRecord>> =
            serde_json::from_value(json!({"success": false, "message": "Table not found"})).unwrap();
        assert!(!parsed.success);
        assert!(parsed.data.is_none());
        assert_eq!(parsed.message.as_deref(), Some("Table not found"));
    }

    #[test]
    fn batched_results_round_trip_through_json() {
        let response: StoreResponse<RawRecord> = StoreResponse::batch(vec![
            RecordResult::ok(RawRecord::new().with("Id", 1)),
            RecordResult::failed("Invalid email"),
        ]);
        let parsed: StoreResponse<RawRecord> =
            serde_json::from_value(serde_json::to_value(&response).unwrap()).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn delete_request_uses_record_ids_key() {
        let value = serde_json::to_value(DeleteRequest { record_ids: vec![3, 4] }).unwrap();
        assert_eq!(value, json!({"RecordIds": [3, 4]}));
    }
}
