use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::engine::{
    DeleteRequest, FetchQuery, RecordBatch, RecordStore, StoreResponse,
};
use crate::config::HttpStoreConfig;
use crate::core::{CrmError, RecordId, Result};
use crate::normalize::RawRecord;

pub const PROJECT_HEADER: &str = "X-Project-Id";
pub const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

/// Record service client over HTTP.
pub struct HttpRecordStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpRecordStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CrmError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.config.base_url, table)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(PROJECT_HEADER, &self.config.project_id);
        match &self.config.public_key {
            Some(key) => builder.header(PUBLIC_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn send<B, T>(&self, method: Method, url: String, body: &B) -> Result<StoreResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("record service {} {}", method, url);
        let response = self.request(method, url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<JsonValue>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(JsonValue::as_str).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(CrmError::Transport(format!("HTTP {}: {}", status.as_u16(), detail)));
        }
        Ok(response.json::<StoreResponse<T>>().await?)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> Result<StoreResponse<Vec<RawRecord>>> {
        let url = format!("{}/query", self.records_url(table));
        self.send(Method::POST, url, query).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &FetchQuery,
    ) -> Result<StoreResponse<RawRecord>> {
        let url = format!("{}/{}/query", self.records_url(table), id);
        self.send(Method::POST, url, query).await
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>> {
        let body = RecordBatch { records };
        self.send(Method::POST, self.records_url(table), &body).await
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RawRecord>,
    ) -> Result<StoreResponse<RawRecord>> {
        let body = RecordBatch { records };
        self.send(Method::PATCH, self.records_url(table), &body).await
    }

    async fn delete_records(
        &self,
        table: &str,
        ids: Vec<RecordId>,
    ) -> Result<StoreResponse<JsonValue>> {
        let body = DeleteRequest { record_ids: ids };
        self.send(Method::DELETE, self.records_url(table), &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rejects_invalid_config() {
        let config = HttpStoreConfig::new("http://localhost:1", "").request_timeout(Duration::from_secs(1));
        assert!(matches!(HttpRecordStore::new(config), Err(CrmError::Config(_))));
    }

    #[test]
    fn builds_table_urls() {
        let store = HttpRecordStore::new(HttpStoreConfig::new("http://localhost:8080/api/", "crm")).unwrap();
        assert_eq!(store.records_url("deal_c"), "http://localhost:8080/api/tables/deal_c/records");
    }
}
