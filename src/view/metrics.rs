use serde::Serialize;

use crate::core::earliest;
use crate::model::{Activity, Contact, Deal, DealStage};

pub const DEFAULT_TOP_DEALS: usize = 6;
pub const DEFAULT_RECENT_ACTIVITIES: usize = 10;

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_value: f64,
    pub active_deals: usize,
    pub won_deals: usize,
    /// Whole percent of deals won; 0 with no deals.
    pub conversion_rate: u32,
    pub total_contacts: usize,
}

pub fn compute_dashboard_metrics(deals: &[Deal], contacts: &[Contact]) -> DashboardMetrics {
    let total_value = deals.iter().map(|d| d.value).sum();
    let active_deals = deals.iter().filter(|d| d.is_active()).count();
    let won_deals = deals.iter().filter(|d| d.stage == DealStage::ClosedWon).count();
    DashboardMetrics {
        total_value,
        active_deals,
        won_deals,
        conversion_rate: conversion_rate(won_deals, deals.len()),
        total_contacts: contacts.len(),
    }
}

fn conversion_rate(won: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (won as f64 / total as f64 * 100.0).round() as u32
}

/// Open deals by value, largest first. Equal values keep input order.
pub fn top_deals(deals: &[Deal], limit: usize) -> Vec<Deal> {
    let mut open: Vec<Deal> = deals.iter().filter(|d| d.is_active()).cloned().collect();
    open.sort_by(|a, b| b.value.total_cmp(&a.value));
    open.truncate(limit);
    open
}

/// Newest activities first; undated ones sort last.
pub fn recent_activities(activities: &[Activity], limit: usize) -> Vec<Activity> {
    let mut sorted = activities.to_vec();
    sorted.sort_by_key(|a| std::cmp::Reverse(a.timestamp.unwrap_or_else(earliest)));
    sorted.truncate(limit);
    sorted
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub metrics: DashboardMetrics,
    pub top_deals: Vec<Deal>,
    pub recent_activities: Vec<Activity>,
}

pub fn build_dashboard(
    deals: &[Deal],
    contacts: &[Contact],
    activities: &[Activity],
    top_limit: usize,
    recent_limit: usize,
) -> DashboardView {
    DashboardView {
        metrics: compute_dashboard_metrics(deals, contacts),
        top_deals: top_deals(deals, top_limit),
        recent_activities: recent_activities(activities, recent_limit),
    }
}
