use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod activity;
pub mod company;
pub mod user;

pub use activity::Activity;
pub use company::{Company, CompanyPayload, SubscriptionStatus, SubscriptionTier};
pub use user::{User, UserPayload, UserRole};

/// List endpoints answer either with a bare array or a paged envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paged {
        items: Vec<T>,
        #[serde(default)]
        total_count: Option<u64>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Plain(items) | Self::Paged { items, .. } => items,
        }
    }
}

/// Number of records a list response represents.
///
/// `total_count` wins, then the length of the array (bare or under `items`).
pub fn record_count(value: &Value) -> Option<u64> {
    if let Some(total) = value.get("total_count").and_then(Value::as_u64) {
        return Some(total);
    }
    if let Some(items) = value.as_array() {
        return Some(items.len() as u64);
    }
    value
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.len() as u64)
}

/// Parse a backend timestamp, with or without a UTC offset
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// Date part of a timestamp for display, empty when unparseable
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// First `n` characters, used for avatar initials
pub(crate) fn leading_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
