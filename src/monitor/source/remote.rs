use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, instrument, warn};

use crate::errors::monitor_error::MonitorError;
use crate::monitor::reading::Reading;
use crate::monitor::source::ReadingSource;
use crate::proxy::QvixSeries;
use crate::utils::custom_date_serde;

/// Fallback IV for futures symbols (those containing `F`).
pub const FUTURES_FALLBACK_IV: f64 = 4.4;
/// Fallback IV for every other symbol.
pub const DEFAULT_FALLBACK_IV: f64 = 3.6;

/// Value substituted when a symbol cannot be fetched.
pub fn fallback_volatility(symbol: &str) -> f64 {
    if symbol.contains('F') {
        FUTURES_FALLBACK_IV
    } else {
        DEFAULT_FALLBACK_IV
    }
}

/// One row of a QVIX series as served by the proxy.
#[derive(Debug, Deserialize)]
pub struct QvixPoint {
    #[serde(deserialize_with = "custom_date_serde::deserialize")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "number_or_string")]
    pub close: f64,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Reads the latest QVIX close for each symbol through the caching proxy.
///
/// Each symbol is fetched independently; a failure or a symbol with no known
/// series yields a fallback reading marked `is_default`.
pub struct RemoteSource {
    proxy_base_url: String,
    http: reqwest::Client,
    tz: Tz,
}

impl RemoteSource {
    pub fn new(proxy_base_url: impl Into<String>, tz: Tz) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            proxy_base_url: proxy_base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            tz,
        }
    }

    async fn fetch_latest(&self, symbol: &str, series: QvixSeries) -> Result<QvixPoint, MonitorError> {
        let upstream_error = |reason: String| MonitorError::UpstreamFetch {
            symbol: symbol.to_string(),
            reason,
        };

        let url = format!("{}{}", self.proxy_base_url, series.endpoint());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| upstream_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(format!("proxy responded with status {status}")));
        }

        let points = response
            .json::<Vec<QvixPoint>>()
            .await
            .map_err(|e| upstream_error(e.to_string()))?;

        let latest = points
            .into_iter()
            .last()
            .ok_or_else(|| upstream_error("series is empty".to_string()))?;

        if !latest.close.is_finite() {
            return Err(upstream_error(format!("latest close is not finite: {}", latest.close)));
        }

        Ok(latest)
    }

    fn fallback(&self, symbol: &str) -> Reading {
        Reading {
            is_default: true,
            ..Reading::new(symbol, fallback_volatility(symbol), self.tz)
        }
    }

    #[instrument(skip(self))]
    async fn fetch_symbol(&self, symbol: &str) -> Reading {
        let Some(series) = QvixSeries::for_symbol(symbol) else {
            warn!(symbol, "no series mapped for symbol, using fallback");
            return self.fallback(symbol);
        };

        match self.fetch_latest(symbol, series).await {
            Ok(point) => {
                debug!(symbol, series = %series, iv = point.close, "fetched latest close");
                Reading {
                    date: Some(point.date),
                    ..Reading::new(symbol, point.close, self.tz)
                }
            }
            Err(e) => {
                warn!(error = %e, "using fallback volatility");
                self.fallback(symbol)
            }
        }
    }
}

#[async_trait]
impl ReadingSource for RemoteSource {
    async fn fetch(&self, symbols: &[String]) -> Vec<Reading> {
        let mut readings = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            readings.push(self.fetch_symbol(symbol).await);
        }

        let fallbacks = readings.iter().filter(|r| r.is_default).count();
        info!(count = readings.len(), fallbacks, "fetched remote readings");
        readings
    }
}
