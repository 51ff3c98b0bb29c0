use super::state::{LoadState, PageScope, settle_load};
use crate::config::CrmConfig;
use crate::gateway::{ActivityGateway, ContactGateway, DealGateway, Gateways};
use crate::model::{Activity, Contact, Deal};
use crate::view::{DEFAULT_RECENT_ACTIVITIES, DEFAULT_TOP_DEALS, DashboardView, build_dashboard};

pub struct DashboardPage {
    deals_gateway: DealGateway,
    contacts_gateway: ContactGateway,
    activities_gateway: ActivityGateway,
    scope: PageScope,
    state: LoadState,
    deals: Vec<Deal>,
    contacts: Vec<Contact>,
    activities: Vec<Activity>,
    top_deals_limit: usize,
    recent_activities_limit: usize,
}

impl DashboardPage {
    pub const LOAD_FAILED: &'static str = "Failed to load dashboard data";

    pub fn new(gateways: &Gateways) -> Self {
        Self::with_scope(gateways, PageScope::new())
    }

    pub fn from_config(gateways: &Gateways, config: &CrmConfig) -> Self {
        let mut page = Self::new(gateways);
        page.top_deals_limit = config.top_deals_limit;
        page.recent_activities_limit = config.recent_activities_limit;
        page
    }

    pub fn with_scope(gateways: &Gateways, scope: PageScope) -> Self {
        Self {
            deals_gateway: gateways.deals.clone(),
            contacts_gateway: gateways.contacts.clone(),
            activities_gateway: gateways.activities.clone(),
            scope,
            state: LoadState::Loading,
            deals: Vec::new(),
            contacts: Vec::new(),
            activities: Vec::new(),
            top_deals_limit: DEFAULT_TOP_DEALS,
            recent_activities_limit: DEFAULT_RECENT_ACTIVITIES,
        }
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let result = futures::try_join!(
            self.deals_gateway.try_get_all(),
            self.contacts_gateway.try_get_all(),
            self.activities_gateway.try_get_all()
        );
        if let Some((deals, contacts, activities)) =
            settle_load("dashboard", &self.scope, &mut self.state, result, Self::LOAD_FAILED)
        {
            self.deals = deals;
            self.contacts = contacts;
            self.activities = activities;
        }
    }

    pub async fn retry(&mut self) {
        self.load().await;
    }

    pub fn view(&self) -> DashboardView {
        build_dashboard(
            &self.deals,
            &self.contacts,
            &self.activities,
            self.top_deals_limit,
            self.recent_activities_limit,
        )
    }
}
