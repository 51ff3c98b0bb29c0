// ============================================================================
// Dealflow Library
// ============================================================================

pub mod config;
pub mod core;
pub mod gateway;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod page;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod view;
pub mod web;

use std::sync::Arc;

// Re-export main types for convenience
pub use crate::core::{CrmError, FieldValue, RecordId, Result, Timestamp};
pub use config::{CrmConfig, HttpStoreConfig};
pub use gateway::{
    ActivityGateway, ContactGateway, DealGateway, Gateway, Gateways, StageGateway,
};
pub use model::{
    Activity, ActivityPatch, ActivityType, Contact, ContactPatch, Deal, DealPatch, DealStage,
    EnrichedContact, Entity, EntityKind, Stage, StagePatch,
};
pub use notify::{LogNotifier, Notification, NotificationCenter, NotificationLevel, Notifier};
pub use page::{ContactsPage, DashboardPage, DealsPage, LoadState, PageScope};
pub use pipeline::{DragState, PipelineBoard, TransitionOutcome};
pub use query::{SortOrder, SortState, StageFilter, ViewQuery, filter_and_sort};
pub use store::{FaultMode, HttpRecordStore, MemoryRecordStore, RecordStore};

// ============================================================================
// High-level API
// ============================================================================

/// A record service plus everything the views need around it.
///
/// This is the recommended entry point: it binds one gateway per entity to
/// the store, routes every notification into a shared [`NotificationCenter`],
/// and hands out page controllers.
///
/// # Examples
///
/// ```
/// use dealflow::{Crm, CrmConfig};
///
/// # tokio_test::block_on(async {
/// let crm = Crm::in_memory(CrmConfig::default()).unwrap();
/// let mut board = crm.pipeline_board();
/// board.load().await;
/// assert!(board.state().is_ready());
/// # });
/// ```
#[derive(Clone)]
pub struct Crm {
    config: CrmConfig,
    store: Arc<dyn RecordStore>,
    notifications: NotificationCenter,
    gateways: Gateways,
}

impl Crm {
    /// Bind to any record store.
    pub fn with_store(store: Arc<dyn RecordStore>, config: CrmConfig) -> Result<Self> {
        config.validate()?;
        let notifications = NotificationCenter::new(config.notification_capacity);
        let notifier: Arc<dyn Notifier> = Arc::new(notifications.clone());
        let gateways = Gateways::new(Arc::clone(&store), notifier, &config);
        Ok(Self {
            config,
            store,
            notifications,
            gateways,
        })
    }

    /// Backed by a fresh, empty [`MemoryRecordStore`].
    pub fn in_memory(config: CrmConfig) -> Result<Self> {
        Self::with_store(Arc::new(MemoryRecordStore::new()), config)
    }

    /// Backed by the hosted record service.
    pub fn connect(http: HttpStoreConfig, config: CrmConfig) -> Result<Self> {
        Self::with_store(Arc::new(HttpRecordStore::new(http)?), config)
    }

    /// Connect using a connection string
    ///
    /// Format: `http[s]://[public_key@]host[:port][/path]?project=<id>`
    pub fn connect_url(url: &str) -> Result<Self> {
        Self::connect(HttpStoreConfig::from_url(url)?, CrmConfig::default())
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn gateways(&self) -> &Gateways {
        &self.gateways
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn contacts_page(&self) -> ContactsPage {
        ContactsPage::new(&self.gateways)
    }

    pub fn deals_page(&self) -> DealsPage {
        DealsPage::new(&self.gateways)
    }

    pub fn dashboard_page(&self) -> DashboardPage {
        DashboardPage::from_config(&self.gateways, &self.config)
    }

    pub fn pipeline_board(&self) -> PipelineBoard {
        PipelineBoard::new(&self.gateways)
    }

    /// Amount in the configured currency.
    pub fn format_currency(&self, amount: f64) -> String {
        view::format_amount(amount, &self.config.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Crm::in_memory(CrmConfig::new().notification_capacity(0)).is_err());
        assert!(Crm::connect_url("ftp://records.example.com?project=crm").is_err());
    }

    #[tokio::test]
    async fn test_in_memory_pages_load_empty() {
        let crm = Crm::in_memory(CrmConfig::default()).unwrap();

        let mut contacts = crm.contacts_page();
        contacts.load().await;
        assert!(contacts.state().is_ready());
        assert!(contacts.rows().is_empty());

        let mut dashboard = crm.dashboard_page();
        dashboard.load().await;
        assert_eq!(dashboard.view().metrics.conversion_rate, 0);
        assert!(crm.notifications().is_empty());
    }

    #[test]
    fn test_currency_follows_config() {
        let crm = Crm::in_memory(CrmConfig::new().currency("EUR")).unwrap();
        assert_eq!(crm.format_currency(2500.0), "\u{20ac}2,500");
    }
}
