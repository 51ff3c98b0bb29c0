//! Page controllers.
//!
//! Each page owns its record collections for its lifetime. Loads issue every
//! fetch at once and join them; one failure puts the page into
//! `LoadState::Failed` and `retry()` re-issues all of them.

mod contacts;
mod dashboard;
mod deals;
mod state;

pub use contacts::{CONTACT_SEARCH_FIELDS, ContactsPage};
pub use dashboard::DashboardPage;
pub use deals::{DEAL_SEARCH_FIELDS, DealsPage};
pub use state::{LoadState, PageScope};

pub(crate) use state::settle_load;
