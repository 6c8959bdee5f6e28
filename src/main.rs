use std::time::Duration;

use dotenvy::dotenv;
use iv_monitor::{config::ProxyConfig, logger::init_tracing, routes::register_routes, state::AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid proxy configuration");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config.clone());
    state
        .proxy
        .cache()
        .start_background_task(Duration::from_secs(config.cache_ttl_secs));

    let app = register_routes(state);
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.app_server_port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, port = config.app_server_port, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(
        port = config.app_server_port,
        upstream = %config.upstream_base_url,
        ttl_secs = config.cache_ttl_secs,
        "proxy listening"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server stopped with error");
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received, stopping proxy");
    }
}
