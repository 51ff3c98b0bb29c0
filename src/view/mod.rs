//! View models: pure functions from record collections to display data.
//!
//! Nothing here mutates its inputs or fails on malformed records; missing
//! numbers count as zero and missing dates as the earliest instant.

mod board;
mod enrich;
mod format;
mod metrics;
mod rows;

pub use board::{StageBucket, StageStyle, build_stage_buckets, group_deals_by_stage};
pub use enrich::enrich_contacts;
pub use format::{
    ProbabilityTier, format_amount, format_currency, format_date, format_last_contact, format_short_date,
    format_total_value,
};
pub use metrics::{
    DEFAULT_RECENT_ACTIVITIES, DEFAULT_TOP_DEALS, DashboardMetrics, DashboardView,
    build_dashboard, compute_dashboard_metrics, recent_activities, top_deals,
};
pub use rows::{DealRow, UNKNOWN_CONTACT, build_deal_rows, contact_name};
