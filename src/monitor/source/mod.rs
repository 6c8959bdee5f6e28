//! Where each cycle's readings come from.

use async_trait::async_trait;

use crate::monitor::reading::Reading;

pub mod remote;
pub mod synthetic;

pub use remote::RemoteSource;
pub use synthetic::{SyntheticPolicy, SyntheticSource};

/// Produces one reading per requested symbol.
///
/// Implementations absorb per-symbol failures themselves; validation of the
/// returned readings happens in the scheduler.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch(&self, symbols: &[String]) -> Vec<Reading>;
}
