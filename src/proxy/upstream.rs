use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::{debug, instrument};

use crate::errors::monitor_error::ProxyUpstreamError;

/// Thin HTTP client for the upstream data API.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Fetches `{base_url}{endpoint}` with `params` as the query string and
    /// returns the decoded JSON body.
    ///
    /// # Errors
    /// - `Status` for any non-2xx response.
    /// - `Request` for transport failures and bodies that are not JSON.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<serde_json::Value, ProxyUpstreamError> {
        let request_url = format!("{}{}", self.base_url, endpoint);

        let response = self.http.get(request_url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyUpstreamError::Status(status.as_u16()));
        }

        let body = response.json::<serde_json::Value>().await?;
        debug!(endpoint, "upstream responded");

        Ok(body)
    }
}
