use std::time::Duration;

use crate::config::ProxyConfig;
use crate::proxy::{CachingDataProxy, UpstreamClient};

#[derive(Clone)]
pub struct AppState {
    pub proxy: CachingDataProxy,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        let upstream = UpstreamClient::new(config.upstream_base_url.clone());
        let proxy = CachingDataProxy::new(upstream, Duration::from_secs(config.cache_ttl_secs));

        Self { proxy }
    }
}
