pub mod api_error;
pub mod monitor_error;
