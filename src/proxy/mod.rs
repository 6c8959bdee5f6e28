//! Caching front for the upstream QVIX data API.

pub mod caching_proxy;
pub mod series;
pub mod upstream;

pub use caching_proxy::{CacheKey, CachingDataProxy};
pub use series::QvixSeries;
pub use upstream::UpstreamClient;
