pub mod cache;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod logger;
pub mod monitor;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod utils;
