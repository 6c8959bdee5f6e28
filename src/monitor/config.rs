use serde::{Deserialize, Serialize};

pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;

/// User-facing monitor settings, stored under the `config` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub symbols: Vec<String>,
    pub refresh_interval_seconds: u64,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    /// Absolute percentage move that triggers a notification.
    pub threshold_percent: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["IF".to_string(), "IC".to_string(), "IH".to_string()],
            refresh_interval_seconds: 60,
            notifications: NotificationSettings::default(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_percent: 5.0,
        }
    }
}

/// Partial configuration. Every field left as `None` keeps the base value.
///
/// Stored configs are also read through this type, so records written by an
/// older build still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettingsUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<f64>,
}

impl MonitorConfig {
    /// Applies `update` on top of `self` and normalizes the result.
    ///
    /// Symbols are trimmed, upper-cased and deduplicated in order; an update
    /// whose symbol list ends up empty keeps the current symbols. The interval
    /// is clamped to at least one second. A non-positive or non-finite
    /// threshold keeps the current one.
    pub fn merge(&self, update: &MonitorConfigUpdate) -> MonitorConfig {
        let mut merged = self.clone();

        if let Some(symbols) = &update.symbols {
            let symbols = normalize_symbols(symbols);
            if !symbols.is_empty() {
                merged.symbols = symbols;
            }
        }

        if let Some(interval) = update.refresh_interval_seconds {
            merged.refresh_interval_seconds = interval.max(MIN_REFRESH_INTERVAL_SECS);
        }

        if let Some(notifications) = &update.notifications {
            if let Some(enabled) = notifications.enabled {
                merged.notifications.enabled = enabled;
            }
            if let Some(threshold) = notifications.threshold_percent {
                if threshold.is_finite() && threshold > 0.0 {
                    merged.notifications.threshold_percent = threshold;
                }
            }
        }

        merged
    }
}

fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() && !normalized.contains(&symbol) {
            normalized.push(symbol);
        }
    }
    normalized
}
