//! Record gateway
//!
//! One `Gateway<E>` per entity type. Every operation comes in two flavours:
//!
//! - `try_*` returns `Result` and stays silent; callers that need to branch
//!   on failure (page loads, the pipeline board) use these and report for
//!   themselves.
//! - the plain form never fails: it logs, raises a user notification and
//!   resolves to an empty list, `None` or `false`.

mod entity_ops;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use log::error;

use crate::config::CrmConfig;
use crate::core::{CrmError, IntoRecordId, RecordId, Result};
use crate::model::{Activity, Contact, Deal, Entity, Stage};
use crate::normalize::{ID_FIELD, RawRecord};
use crate::notify::Notifier;
use crate::store::{FetchQuery, RecordResult, RecordStore, StoreResponse};

pub type ContactGateway = Gateway<Contact>;
pub type DealGateway = Gateway<Deal>;
pub type StageGateway = Gateway<Stage>;
pub type ActivityGateway = Gateway<Activity>;

pub struct Gateway<E: Entity> {
    store: Option<Arc<dyn RecordStore>>,
    table: String,
    notifier: Arc<dyn Notifier>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Gateway<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            table: self.table.clone(),
            notifier: Arc::clone(&self.notifier),
            _entity: PhantomData,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Self::List | Self::Get => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A write the service accepted, plus messages for any sibling records it
/// refused in the same batch.
struct Settled<T> {
    value: T,
    rejected: Vec<String>,
}

impl<E: Entity> Gateway<E> {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, table: &str) -> Self {
        Self {
            store: Some(store),
            table: table.to_string(),
            notifier,
            _entity: PhantomData,
        }
    }

    pub fn from_config(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: &CrmConfig,
    ) -> Self {
        Self::new(store, notifier, config.table_for(E::KIND))
    }

    /// A gateway with no record service bound. Every call fails with
    /// `NotInitialized`.
    pub fn detached(notifier: Arc<dyn Notifier>, table: &str) -> Self {
        Self {
            store: None,
            table: table.to_string(),
            notifier,
            _entity: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn store(&self) -> Result<&Arc<dyn RecordStore>> {
        self.store.as_ref().ok_or(CrmError::NotInitialized)
    }

    fn query() -> FetchQuery {
        FetchQuery::fields(E::select_fields())
    }

    // ------------------------------------------------------------------
    // Fallible operations
    // ------------------------------------------------------------------

    pub async fn try_get_all(&self) -> Result<Vec<E>> {
        let response = self.store()?.fetch_records(&self.table, &Self::query()).await?;
        let rows = accepted(response)?.unwrap_or_default();
        Ok(rows.iter().map(E::from_record).collect())
    }

    pub async fn try_get_by_id(&self, id: impl IntoRecordId) -> Result<E> {
        let id = resolve_id::<E>(id)?;
        let response = self
            .store()?
            .get_record_by_id(&self.table, id, &Self::query())
            .await?;
        accepted(response)?
            .map(|raw| E::from_record(&raw))
            .ok_or_else(|| CrmError::not_found(E::KIND.label(), id))
    }

    pub async fn try_create(&self, patch: &E::Patch) -> Result<E> {
        self.create_settled(patch).await.map(|settled| settled.value)
    }

    pub async fn try_update(&self, id: impl IntoRecordId, patch: &E::Patch) -> Result<E> {
        self.update_settled(id, patch).await.map(|settled| settled.value)
    }

    pub async fn try_delete(&self, id: impl IntoRecordId) -> Result<()> {
        self.delete_settled(id).await.map(|settled| settled.value)
    }

    async fn create_settled(&self, patch: &E::Patch) -> Result<Settled<E>> {
        let record = E::create_record(patch, Utc::now());
        let response = self.store()?.create_records(&self.table, vec![record]).await?;
        self.settle_write(response, Operation::Create)
    }

    async fn update_settled(&self, id: impl IntoRecordId, patch: &E::Patch) -> Result<Settled<E>> {
        let id = resolve_id::<E>(id)?;
        let mut record = E::update_record(patch);
        record.insert(ID_FIELD, id);
        let response = self.store()?.update_records(&self.table, vec![record]).await?;
        self.settle_write(response, Operation::Update)
    }

    async fn delete_settled(&self, id: impl IntoRecordId) -> Result<Settled<()>> {
        let id = resolve_id::<E>(id)?;
        let response = self.store()?.delete_records(&self.table, vec![id]).await?;
        if !response.success {
            return Err(CrmError::Rejected(response.message.unwrap_or_default()));
        }
        let Some(results) = response.results else {
            return Ok(Settled {
                value: (),
                rejected: Vec::new(),
            });
        };
        let rejected = self.log_rejections(&results, Operation::Delete);
        if results.iter().any(|r| r.success) {
            Ok(Settled { value: (), rejected })
        } else {
            Err(batch_rejected(E::KIND.label(), &results))
        }
    }

    /// Keep the first record the service accepted; refused siblings are
    /// logged and handed back for reporting.
    fn settle_write(&self, response: StoreResponse<RawRecord>, op: Operation) -> Result<Settled<E>> {
        if !response.success {
            return Err(CrmError::Rejected(response.message.unwrap_or_default()));
        }
        if let Some(results) = response.results {
            let rejected = self.log_rejections(&results, op);
            return results
                .iter()
                .find(|r| r.success)
                .and_then(|r| r.data.as_ref())
                .map(|raw| Settled {
                    value: E::from_record(raw),
                    rejected,
                })
                .ok_or_else(|| batch_rejected(E::KIND.label(), &results));
        }
        response
            .data
            .map(|raw| Settled {
                value: E::from_record(&raw),
                rejected: Vec::new(),
            })
            .ok_or_else(|| CrmError::Rejected(format!("Empty {} response", E::KIND.label())))
    }

    fn log_rejections(&self, results: &[RecordResult], op: Operation) -> Vec<String> {
        let failed: Vec<&RecordResult> = results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            error!(
                "Failed to {} {} {}: {:?}",
                op.verb(),
                failed.len(),
                E::KIND.plural(),
                failed
                    .iter()
                    .map(|r| r.message.as_deref().unwrap_or(""))
                    .collect::<Vec<_>>()
            );
        }
        failed
            .iter()
            .filter_map(|r| r.message.clone())
            .filter(|m| !m.trim().is_empty())
            .collect()
    }

    // ------------------------------------------------------------------
    // Non-failing operations
    // ------------------------------------------------------------------

    pub async fn get_all(&self) -> Vec<E> {
        match self.try_get_all().await {
            Ok(rows) => rows,
            Err(err) => {
                self.surface(&err, Operation::List);
                Vec::new()
            }
        }
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<E> {
        match self.try_get_by_id(id).await {
            Ok(entity) => Some(entity),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                self.surface(&err, Operation::Get);
                None
            }
        }
    }

    pub async fn create(&self, patch: &E::Patch) -> Option<E> {
        let settled = self.create_settled(patch).await;
        self.finish(settled, Operation::Create)
    }

    pub async fn update(&self, id: impl IntoRecordId, patch: &E::Patch) -> Option<E> {
        let settled = self.update_settled(id, patch).await;
        self.finish(settled, Operation::Update)
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> bool {
        let settled = self.delete_settled(id).await;
        self.finish(settled, Operation::Delete).is_some()
    }

    fn finish<T>(&self, settled: Result<Settled<T>>, op: Operation) -> Option<T> {
        match settled {
            Ok(settled) => {
                for message in &settled.rejected {
                    self.notifier.error(message);
                }
                Some(settled.value)
            }
            Err(err) => {
                self.surface(&err, op);
                None
            }
        }
    }

    /// Log a failure and tell the user about it. Each refused record of a
    /// batch is reported on its own.
    fn surface(&self, err: &CrmError, op: Operation) {
        let noun = match op {
            Operation::List => E::KIND.plural(),
            _ => E::KIND.label(),
        };
        error!("Error during {} {} on '{}': {}", op.verb(), noun, self.table, err);
        if let CrmError::BatchRejected { messages, .. } = err {
            if !messages.is_empty() {
                for message in messages {
                    self.notifier.error(message);
                }
                return;
            }
        }
        let fallback = format!("Failed to {} {}", op.verb(), noun);
        self.notifier.error(&err.user_message(&fallback));
    }
}

/// Ids that do not coerce to an integer cannot match any record.
fn resolve_id<E: Entity>(id: impl IntoRecordId) -> Result<RecordId> {
    id.into_record_id().ok_or_else(|| CrmError::NotFound {
        entity: E::KIND.label().to_string(),
        id: "<invalid>".to_string(),
    })
}

/// Unwrap an explicit refusal into `Rejected`.
fn accepted<T>(response: StoreResponse<T>) -> Result<Option<T>> {
    if response.success {
        Ok(response.data)
    } else {
        Err(CrmError::Rejected(response.message.unwrap_or_default()))
    }
}

fn batch_rejected(entity: &str, results: &[RecordResult]) -> CrmError {
    CrmError::BatchRejected {
        entity: entity.to_string(),
        failed: results.iter().filter(|r| !r.success).count(),
        messages: results
            .iter()
            .filter_map(|r| r.message.clone())
            .filter(|m| !m.trim().is_empty())
            .collect(),
    }
}

/// One gateway per entity, sharing a store and notifier.
#[derive(Clone)]
pub struct Gateways {
    pub contacts: ContactGateway,
    pub deals: DealGateway,
    pub stages: StageGateway,
    pub activities: ActivityGateway,
}

impl Gateways {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, config: &CrmConfig) -> Self {
        Self {
            contacts: Gateway::from_config(Arc::clone(&store), Arc::clone(&notifier), config),
            deals: Gateway::from_config(Arc::clone(&store), Arc::clone(&notifier), config),
            stages: Gateway::from_config(Arc::clone(&store), Arc::clone(&notifier), config),
            activities: Gateway::from_config(store, notifier, config),
        }
    }

    /// Every gateway without a record service.
    pub fn detached(notifier: Arc<dyn Notifier>, config: &CrmConfig) -> Self {
        Self {
            contacts: Gateway::detached(Arc::clone(&notifier), &config.contact_table),
            deals: Gateway::detached(Arc::clone(&notifier), &config.deal_table),
            stages: Gateway::detached(Arc::clone(&notifier), &config.stage_table),
            activities: Gateway::detached(notifier, &config.activity_table),
        }
    }
}
