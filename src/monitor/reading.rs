use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One instrument's implied volatility at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub symbol: String,
    pub implied_volatility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub update_time: String,
    /// Data date reported upstream, when the reading came from the proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Set when the value is a fallback rather than observed data.
    #[serde(default)]
    pub is_default: bool,
}

impl Reading {
    pub fn new(symbol: impl Into<String>, implied_volatility: f64, tz: Tz) -> Self {
        Self {
            symbol: symbol.into(),
            implied_volatility,
            price: None,
            update_time: update_time_now(tz),
            date: None,
            is_default: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.symbol.trim().is_empty() && self.implied_volatility.is_finite()
    }
}

/// A reading plus its move against the previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingWithChange {
    #[serde(flatten)]
    pub reading: Reading,
    /// Absolute IV difference from the prior reading.
    pub change: f64,
    pub change_percent: f64,
}

/// Last known readings, at most one per symbol.
pub type Snapshot = Vec<ReadingWithChange>;

/// Wall-clock time of day in `tz`, as shown next to each reading.
pub fn update_time_now(tz: Tz) -> String {
    Utc::now().with_timezone(&tz).format("%H:%M:%S").to_string()
}

/// Drops readings without a symbol or with a non-finite volatility, and
/// keeps only the first reading for each symbol.
pub fn validate_readings(readings: Vec<Reading>) -> Vec<Reading> {
    let mut seen = HashSet::new();

    readings
        .into_iter()
        .filter(|reading| {
            if !reading.is_valid() {
                warn!(symbol = %reading.symbol, iv = reading.implied_volatility, "dropping invalid reading");
                return false;
            }
            if !seen.insert(reading.symbol.clone()) {
                warn!(symbol = %reading.symbol, "dropping duplicate reading");
                return false;
            }
            true
        })
        .collect()
}
