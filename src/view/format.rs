//! Display formatting shared by list rows, cards and the dashboard.

use serde::Serialize;

use crate::core::Timestamp;

/// Whole-dollar amount with thousands separators: `$12,500`, `-$40`.
pub fn format_currency(amount: f64) -> String {
    format_amount(amount, "USD")
}

fn currency_prefix(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "EUR" => "\u{20ac}".to_string(),
        "GBP" => "\u{a3}".to_string(),
        other => format!("{other} "),
    }
}

/// Whole units of `currency` (an ISO code), grouped by thousands.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let prefix = currency_prefix(currency);
    if negative {
        format!("-{prefix}{grouped}")
    } else {
        format!("{prefix}{grouped}")
    }
}

/// `Jan 05, 2025`
pub fn format_date(at: &Timestamp) -> String {
    at.format("%b %d, %Y").to_string()
}

/// `Jan 05`
pub fn format_short_date(at: &Timestamp) -> String {
    at.format("%b %d").to_string()
}

pub fn format_last_contact(at: Option<&Timestamp>) -> String {
    at.map(format_date).unwrap_or_else(|| "Never".to_string())
}

/// Contact totals show a dash instead of `$0`.
pub fn format_total_value(amount: f64) -> String {
    if amount > 0.0 {
        format_currency(amount)
    } else {
        "\u{2014}".to_string()
    }
}

/// Colour tier of a deal's win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityTier {
    High,
    Medium,
    Fair,
    Low,
}

impl ProbabilityTier {
    pub fn for_probability(probability: u8) -> Self {
        match probability {
            80.. => Self::High,
            60..=79 => Self::Medium,
            40..=59 => Self::Fair,
            _ => Self::Low,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::High => "text-success",
            Self::Medium => "text-warning",
            Self::Fair => "text-amber-600",
            Self::Low => "text-gray-500",
        }
    }
}
