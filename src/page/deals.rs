use std::sync::Arc;

use super::state::{LoadState, PageScope, settle_load};
use crate::gateway::{ContactGateway, DealGateway, Gateways};
use crate::model::{Contact, Deal, DealPatch};
use crate::notify::Notifier;
use crate::query::{SortOrder, SortState, StageFilter, ViewQuery, filter_and_sort};
use crate::view::{DealRow, build_deal_rows};

pub const DEAL_SEARCH_FIELDS: [&str; 2] = ["title", "contactName"];

/// Deals table with stage filter.
pub struct DealsPage {
    deals_gateway: DealGateway,
    contacts_gateway: ContactGateway,
    notifier: Arc<dyn Notifier>,
    scope: PageScope,
    state: LoadState,
    deals: Vec<Deal>,
    contacts: Vec<Contact>,
    search_term: String,
    stage_filter: StageFilter,
    sort: SortState,
}

impl DealsPage {
    pub const LOAD_FAILED: &'static str = "Failed to load deals";

    pub fn new(gateways: &Gateways) -> Self {
        Self::with_scope(gateways, PageScope::new())
    }

    pub fn with_scope(gateways: &Gateways, scope: PageScope) -> Self {
        Self {
            deals_gateway: gateways.deals.clone(),
            contacts_gateway: gateways.contacts.clone(),
            notifier: Arc::clone(gateways.deals.notifier()),
            scope,
            state: LoadState::Loading,
            deals: Vec::new(),
            contacts: Vec::new(),
            search_term: String::new(),
            stage_filter: StageFilter::All,
            sort: SortState::new("value", SortOrder::Desc),
        }
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let result = futures::try_join!(
            self.deals_gateway.try_get_all(),
            self.contacts_gateway.try_get_all()
        );
        if let Some((deals, contacts)) =
            settle_load("deals", &self.scope, &mut self.state, result, Self::LOAD_FAILED)
        {
            self.deals = deals;
            self.contacts = contacts;
        }
    }

    pub async fn retry(&mut self) {
        self.load().await;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// `"all"` or a stage name.
    pub fn set_stage_filter(&mut self, raw: &str) {
        self.stage_filter = StageFilter::parse(raw);
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.sort.toggle(field);
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn query(&self) -> ViewQuery {
        ViewQuery::new()
            .search(self.search_term.clone(), DEAL_SEARCH_FIELDS)
            .stage(self.stage_filter.clone())
            .sort_by(self.sort.field.clone(), self.sort.order)
    }

    pub fn rows(&self) -> Vec<DealRow> {
        let rows = build_deal_rows(&self.deals, &self.contacts);
        filter_and_sort(&rows, &self.query())
    }

    pub async fn add_deal(&mut self, patch: &DealPatch) -> Option<Deal> {
        let created = self.deals_gateway.create(patch).await?;
        self.notifier.success("Deal added successfully!");
        if self.scope.is_mounted() {
            self.deals.push(created.clone());
        }
        Some(created)
    }
}
