use std::time::{Duration, Instant};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::monitor::source::SyntheticPolicy;

/// Settings of the caching data proxy, read from the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,
    #[serde(default = "default_app_server_port")]
    pub app_server_port: u16,
    /// Lifetime of a cached upstream response.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_upstream_base_url() -> String {
    "http://api.akshare.akfamily.xyz".to_string()
}

fn default_app_server_port() -> u16 {
    3000
}

fn default_cache_ttl_secs() -> u64 {
    600
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<ProxyConfig>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), envy::Error> {
        if self.upstream_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "UPSTREAM_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if self.cache_ttl_secs == 0 {
            return Err(envy::Error::Custom(
                "CACHE_TTL_SECS must be at least 1.".to_string(),
            ));
        }

        if Instant::now()
            .checked_add(Duration::from_secs(self.cache_ttl_secs))
            .is_none()
        {
            return Err(envy::Error::Custom(
                "CACHE_TTL_SECS is too large to schedule an expiry.".to_string(),
            ));
        }

        Ok(())
    }
}

/// Process settings of the refresh monitor, read from `IV_MONITOR_*` variables.
///
/// User-facing settings (symbols, interval, notifications) are not here; they
/// live in the key-value store as a [`crate::monitor::config::MonitorConfig`].
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorSettings {
    /// Base URL of the proxy's `/api` surface, used by the remote source.
    #[serde(default = "default_proxy_base_url")]
    pub proxy_base_url: String,
    #[serde(default)]
    pub use_real_data: bool,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    #[serde(default = "default_display_tz")]
    pub display_tz: Tz,
    #[serde(default)]
    pub synthetic_mode: SyntheticMode,
    #[serde(default = "default_synthetic_min")]
    pub synthetic_min: f64,
    #[serde(default = "default_synthetic_max")]
    pub synthetic_max: f64,
    #[serde(default = "default_walk_step")]
    pub walk_max_step: f64,
    #[serde(default = "default_walk_floor")]
    pub walk_floor: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticMode {
    #[default]
    Uniform,
    RandomWalk,
}

fn default_proxy_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_store_path() -> String {
    "iv_monitor_store.json".to_string()
}

fn default_display_tz() -> Tz {
    chrono_tz::Asia::Shanghai
}

fn default_synthetic_min() -> f64 {
    10.0
}

fn default_synthetic_max() -> f64 {
    40.0
}

fn default_walk_step() -> f64 {
    0.5
}

fn default_walk_floor() -> f64 {
    1.0
}

impl MonitorSettings {
    pub fn from_env() -> Result<Self, envy::Error> {
        let settings = envy::prefixed("IV_MONITOR_").from_env::<MonitorSettings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), envy::Error> {
        if self.proxy_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "IV_MONITOR_PROXY_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if self.store_path.trim().is_empty() {
            return Err(envy::Error::Custom(
                "IV_MONITOR_STORE_PATH cannot be empty.".to_string(),
            ));
        }

        if !(self.synthetic_min > 0.0 && self.synthetic_min < self.synthetic_max) {
            return Err(envy::Error::Custom(
                "IV_MONITOR_SYNTHETIC_MIN must be positive and below IV_MONITOR_SYNTHETIC_MAX."
                    .to_string(),
            ));
        }

        if self.walk_floor <= 0.0 || self.walk_max_step < 0.0 {
            return Err(envy::Error::Custom(
                "IV_MONITOR_WALK_FLOOR must be positive and IV_MONITOR_WALK_MAX_STEP non-negative."
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn synthetic_policy(&self) -> SyntheticPolicy {
        match self.synthetic_mode {
            SyntheticMode::Uniform => SyntheticPolicy::Uniform {
                min: self.synthetic_min,
                max: self.synthetic_max,
            },
            SyntheticMode::RandomWalk => SyntheticPolicy::RandomWalk {
                min: self.synthetic_min,
                max: self.synthetic_max,
                max_step: self.walk_max_step,
                floor: self.walk_floor,
            },
        }
    }
}
