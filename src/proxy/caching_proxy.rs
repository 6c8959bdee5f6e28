use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{info, instrument};

use crate::cache::ttl_cache::TtlCache;
use crate::errors::monitor_error::ProxyUpstreamError;
use crate::proxy::upstream::UpstreamClient;

/// Cache key: the endpoint plus its query parameters in sorted order, so
/// `?a=1&b=2` and `?b=2&a=1` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: String,
    pub params: BTreeMap<String, String>,
}

/// Deduplicates upstream calls behind a TTL cache.
#[derive(Clone)]
pub struct CachingDataProxy {
    cache: TtlCache<CacheKey, serde_json::Value>,
    upstream: UpstreamClient,
}

impl CachingDataProxy {
    pub fn new(upstream: UpstreamClient, ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
            upstream,
        }
    }

    pub fn cache(&self) -> &TtlCache<CacheKey, serde_json::Value> {
        &self.cache
    }

    /// Returns the cached payload for `(endpoint, params)` while it is live,
    /// otherwise fetches it upstream and caches the result.
    ///
    /// Upstream failures are returned as-is and leave the cache untouched.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> Result<serde_json::Value, ProxyUpstreamError> {
        let key = CacheKey {
            endpoint: endpoint.to_string(),
            params,
        };

        if let Some(cached) = self.cache.get(&key).await {
            info!(endpoint, "serving cached response");
            return Ok(cached);
        }

        info!(endpoint, "cache miss, requesting upstream");
        let value = self.upstream.fetch(&key.endpoint, &key.params).await?;
        self.cache.insert(key, value.clone()).await;

        Ok(value)
    }
}
