use thiserror::Error;

/// Failures of the persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store is not a JSON object: {0}")]
    Corrupt(String),
}

/// Failures of one refresh cycle or of a reading fetch.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("no valid readings left after validation")]
    NoValidData,

    #[error("upstream fetch failed for {symbol}: {reason}")]
    UpstreamFetch { symbol: String, reason: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Failures talking to the upstream data API behind the proxy.
#[derive(Error, Debug)]
pub enum ProxyUpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream responded with status {0}")]
    Status(u16),
}
