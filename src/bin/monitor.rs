//! Refresh monitor daemon.
//!
//! Runs the scheduler on a single-threaded runtime, logs every
//! `DATA_UPDATED` event as JSON, and accepts one JSON request per stdin line
//! (`{"type":"GET_IV_DATA"}` or `{"type":"UPDATE_CONFIG","config":{...}}`).

use std::sync::Arc;

use dotenvy::dotenv;
use iv_monitor::config::MonitorSettings;
use iv_monitor::logger::init_tracing;
use iv_monitor::monitor::bus::UpdateBus;
use iv_monitor::monitor::notifier::TracingNotifier;
use iv_monitor::monitor::source::{ReadingSource, RemoteSource, SyntheticSource};
use iv_monitor::monitor::store::JsonFileStore;
use iv_monitor::monitor::{MonitorRequest, RefreshScheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    init_tracing();

    let settings = match MonitorSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid monitor settings");
            std::process::exit(1);
        }
    };

    let source: Arc<dyn ReadingSource> = if settings.use_real_data {
        Arc::new(RemoteSource::new(settings.proxy_base_url.clone(), settings.display_tz))
    } else {
        Arc::new(SyntheticSource::new(settings.synthetic_policy(), settings.display_tz))
    };

    let scheduler = RefreshScheduler::new(
        Arc::new(JsonFileStore::new(&settings.store_path)),
        source,
        Arc::new(TracingNotifier),
        UpdateBus::default(),
    );

    spawn_update_logger(scheduler.bus());

    match scheduler.install().await {
        Ok(config) => info!(
            symbols = ?config.symbols,
            every_secs = config.refresh_interval_seconds,
            real_data = settings.use_real_data,
            "monitor started"
        ),
        Err(e) => {
            error!(error = %e, "failed to initialise monitor store");
            std::process::exit(1);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => handle_line(&scheduler, &line).await,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin closed with error");
                    stdin_open = false;
                }
            },
        }
    }

    scheduler.shutdown();
}

async fn handle_line(scheduler: &RefreshScheduler, line: &str) {
    match serde_json::from_str::<MonitorRequest>(line) {
        Ok(request) => {
            let response = scheduler.handle_message(request).await;
            match serde_json::to_string(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => error!(error = %e, "failed to encode response"),
            }
        }
        Err(e) => warn!(error = %e, "ignoring malformed request"),
    }
}

fn spawn_update_logger(bus: &UpdateBus) {
    let mut updates = bus.subscribe();

    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => info!(target: "display", event = %json, "update received"),
                    Err(e) => error!(error = %e, "failed to encode update"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "update logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
