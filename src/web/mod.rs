//! HTTP face of a record store.
//!
//! `record_service` serves any [`RecordStore`] with the same routes and
//! envelopes `HttpRecordStore` speaks, so a `MemoryRecordStore` can stand in
//! for the hosted service during development and tests.
//!
//! Routes (relative to the mount point):
//! - `POST   /tables/:table/records/query`
//! - `POST   /tables/:table/records/:id/query`
//! - `POST   /tables/:table/records`
//! - `PATCH  /tables/:table/records`
//! - `DELETE /tables/:table/records`
//!
//! A refusal by the store is still `200` with `success: false`; only
//! failures to reach the store map to error statuses.
//!
//! `record_service_for_project` scopes a router to one project id. Requests
//! naming any other project get `404 unknown_project`, as if the project's
//! tables did not exist. There is no credential check.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::{HeaderMap, StatusCode};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::{CrmError, parse_id};
use crate::normalize::RawRecord;
use crate::store::{
    DeleteRequest, FetchQuery, PROJECT_HEADER, RecordBatch, RecordStore, StoreResponse,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Store(CrmError),
    Input(String),
    UnknownProject(String),
}

impl From<CrmError> for WebError {
    fn from(err: CrmError) -> Self {
        WebError::Store(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Store(CrmError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                format!("{} {} not found", entity, id),
                "not_found".to_string(),
            ),
            WebError::Store(CrmError::Decode(msg)) | WebError::Store(CrmError::InvalidRecord(msg)) => {
                (StatusCode::BAD_REQUEST, msg, "invalid_record".to_string())
            }
            WebError::Store(CrmError::Transport(msg)) => {
                (StatusCode::BAD_GATEWAY, msg, "transport_error".to_string())
            }
            WebError::Store(CrmError::NotInitialized) => (
                StatusCode::SERVICE_UNAVAILABLE,
                CrmError::NotInitialized.to_string(),
                "not_initialized".to_string(),
            ),
            WebError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "store_error".to_string(),
            ),
            WebError::Input(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg,
                "input_error".to_string(),
            ),
            WebError::UnknownProject(project) => (
                StatusCode::NOT_FOUND,
                format!("project '{}' not found", project),
                "unknown_project".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Clone)]
struct RecordServiceState {
    store: Arc<dyn RecordStore>,
    project: Option<Arc<str>>,
}

impl RecordServiceState {
    fn check_project(&self, headers: &HeaderMap) -> Result<()> {
        let Some(served) = &self.project else {
            return Ok(());
        };
        let requested = headers
            .get(PROJECT_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if requested == served.as_ref() {
            Ok(())
        } else {
            warn!("record service has no project {:?}", requested);
            Err(WebError::UnknownProject(requested.to_string()))
        }
    }
}

/// Router serving `store` to any project.
pub fn record_service(store: Arc<dyn RecordStore>) -> Router {
    build_router(RecordServiceState {
        store,
        project: None,
    })
}

/// Router serving `store` as the tables of `project`. Requests whose
/// `X-Project-Id` names another project are answered `404`.
pub fn record_service_for_project(store: Arc<dyn RecordStore>, project: &str) -> Router {
    build_router(RecordServiceState {
        store,
        project: Some(Arc::from(project)),
    })
}

fn build_router(state: RecordServiceState) -> Router {
    Router::new()
        .route("/tables/:table/records/query", post(fetch_records))
        .route("/tables/:table/records/:id/query", post(get_record))
        .route(
            "/tables/:table/records",
            post(create_records)
                .patch(update_records)
                .delete(delete_records),
        )
        .with_state(state)
}

async fn fetch_records(
    State(state): State<RecordServiceState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(query): Json<FetchQuery>,
) -> Result<Json<StoreResponse<Vec<RawRecord>>>> {
    state.check_project(&headers)?;
    debug!("fetch {} ({} fields)", table, query.fields.len());
    Ok(Json(state.store.fetch_records(&table, &query).await?))
}

async fn get_record(
    State(state): State<RecordServiceState>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(query): Json<FetchQuery>,
) -> Result<Json<StoreResponse<RawRecord>>> {
    state.check_project(&headers)?;
    let id = parse_id(&id).ok_or_else(|| WebError::Input(format!("invalid record id '{}'", id)))?;
    Ok(Json(state.store.get_record_by_id(&table, id, &query).await?))
}

async fn create_records(
    State(state): State<RecordServiceState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(batch): Json<RecordBatch>,
) -> Result<Json<StoreResponse<RawRecord>>> {
    state.check_project(&headers)?;
    Ok(Json(state.store.create_records(&table, batch.records).await?))
}

async fn update_records(
    State(state): State<RecordServiceState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(batch): Json<RecordBatch>,
) -> Result<Json<StoreResponse<RawRecord>>> {
    state.check_project(&headers)?;
    if batch.records.iter().any(|record| record.id().is_none()) {
        return Err(WebError::Input("every updated record needs an Id".to_string()));
    }
    Ok(Json(state.store.update_records(&table, batch.records).await?))
}

async fn delete_records(
    State(state): State<RecordServiceState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<StoreResponse<JsonValue>>> {
    state.check_project(&headers)?;
    Ok(Json(state.store.delete_records(&table, request.record_ids).await?))
}

#[cfg(test)]
mod tests {
    use super::WebError;
    use crate::core::CrmError;
    use axum::response::IntoResponse;
    use http::StatusCode;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (CrmError::Transport("down".into()), StatusCode::BAD_GATEWAY),
            (CrmError::Decode("bad".into()), StatusCode::BAD_REQUEST),
            (CrmError::NotInitialized, StatusCode::SERVICE_UNAVAILABLE),
            (CrmError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(WebError::from(err).into_response().status(), status);
        }
        assert_eq!(
            WebError::Input("no".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn unknown_project_is_not_found() {
        let response = WebError::UnknownProject("other".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
