//! Refresh scheduler and notifier.
//!
//! One cycle: load config -> fetch readings -> validate -> diff against the
//! stored snapshot -> notify -> persist -> publish `DATA_UPDATED`.

pub mod bus;
pub mod change;
pub mod config;
pub mod notifier;
pub mod reading;
pub mod scheduler;
pub mod source;
pub mod store;

pub use scheduler::{MonitorRequest, MonitorResponse, RefreshScheduler};
