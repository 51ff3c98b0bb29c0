use std::sync::Arc;

use super::state::{LoadState, PageScope, settle_load};
use crate::gateway::{ContactGateway, DealGateway, Gateways};
use crate::model::{Contact, ContactPatch, Deal, EnrichedContact};
use crate::notify::Notifier;
use crate::query::{SortOrder, SortState, ViewQuery, filter_and_sort};
use crate::view::enrich_contacts;

pub const CONTACT_SEARCH_FIELDS: [&str; 3] = ["name", "email", "company"];

/// Contacts table: every contact joined with its deals.
pub struct ContactsPage {
    contacts_gateway: ContactGateway,
    deals_gateway: DealGateway,
    notifier: Arc<dyn Notifier>,
    scope: PageScope,
    state: LoadState,
    contacts: Vec<Contact>,
    deals: Vec<Deal>,
    search_term: String,
    sort: SortState,
}

impl ContactsPage {
    pub const LOAD_FAILED: &'static str = "Failed to load contacts";

    pub fn new(gateways: &Gateways) -> Self {
        Self::with_scope(gateways, PageScope::new())
    }

    pub fn with_scope(gateways: &Gateways, scope: PageScope) -> Self {
        Self {
            contacts_gateway: gateways.contacts.clone(),
            deals_gateway: gateways.deals.clone(),
            notifier: Arc::clone(gateways.contacts.notifier()),
            scope,
            state: LoadState::Loading,
            contacts: Vec::new(),
            deals: Vec::new(),
            search_term: String::new(),
            sort: SortState::new("name", SortOrder::Asc),
        }
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let result = futures::try_join!(
            self.contacts_gateway.try_get_all(),
            self.deals_gateway.try_get_all()
        );
        if let Some((contacts, deals)) =
            settle_load("contacts", &self.scope, &mut self.state, result, Self::LOAD_FAILED)
        {
            self.contacts = contacts;
            self.deals = deals;
        }
    }

    pub async fn retry(&mut self) {
        self.load().await;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.sort.toggle(field);
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn query(&self) -> ViewQuery {
        ViewQuery::new()
            .search(self.search_term.clone(), CONTACT_SEARCH_FIELDS)
            .sort_by(self.sort.field.clone(), self.sort.order)
    }

    /// Enriched, searched and sorted rows for the table.
    pub fn rows(&self) -> Vec<EnrichedContact> {
        let enriched = enrich_contacts(&self.contacts, &self.deals);
        filter_and_sort(&enriched, &self.query())
    }

    /// Quick-add. The server's record joins the table on success.
    pub async fn add_contact(&mut self, patch: &ContactPatch) -> Option<Contact> {
        let created = self.contacts_gateway.create(patch).await?;
        self.notifier.success("Contact added successfully!");
        if self.scope.is_mounted() {
            self.contacts.push(created.clone());
        }
        Some(created)
    }
}
