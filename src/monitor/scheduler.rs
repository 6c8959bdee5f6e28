use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::errors::monitor_error::MonitorError;
use crate::monitor::bus::{MonitorEvent, UpdateBus};
use crate::monitor::change::{compute_changes, notifications_for};
use crate::monitor::config::{MonitorConfig, MonitorConfigUpdate, MIN_REFRESH_INTERVAL_SECS};
use crate::monitor::notifier::NotificationSink;
use crate::monitor::reading::{validate_readings, ReadingWithChange, Snapshot};
use crate::monitor::source::ReadingSource;
use crate::monitor::store::{self, KeyValueStore, CONFIG_KEY, SNAPSHOT_KEY};

/// Requests accepted from display surfaces and the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorRequest {
    /// Run a cycle now.
    GetIvData,
    /// Merge a partial config, reschedule and run a cycle.
    UpdateConfig { config: MonitorConfigUpdate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MonitorResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(err: &MonitorError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
        }
    }
}

/// The single recurring trigger registration.
struct Trigger {
    period: Duration,
    handle: JoinHandle<()>,
}

struct SchedulerInner {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn ReadingSource>,
    notifier: Arc<dyn NotificationSink>,
    bus: UpdateBus,
    trigger: Mutex<Option<Trigger>>,
}

/// Owns the recurring refresh trigger and runs refresh cycles.
///
/// Timer ticks and requests all end up in [`RefreshScheduler::run_cycle`].
/// Cycles are not mutually excluded; when two overlap, the last snapshot
/// write wins.
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<SchedulerInner>,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn ReadingSource>,
        notifier: Arc<dyn NotificationSink>,
        bus: UpdateBus,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                source,
                notifier,
                bus,
                trigger: Mutex::new(None),
            }),
        }
    }

    pub fn bus(&self) -> &UpdateBus {
        &self.inner.bus
    }

    /// Period of the active trigger, if one is registered.
    pub fn active_period(&self) -> Option<Duration> {
        self.inner.trigger.lock().as_ref().map(|t| t.period)
    }

    /// Replaces the recurring trigger with one firing every
    /// `interval_seconds` (at least one second). The first tick fires one
    /// period from now.
    pub fn schedule(&self, interval_seconds: u64) {
        let period = Duration::from_secs(interval_seconds.max(MIN_REFRESH_INTERVAL_SECS));
        let mut trigger = self.inner.trigger.lock();

        if let Some(previous) = trigger.take() {
            previous.handle.abort();
        }

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                scheduler.on_tick().await;
            }
        });

        *trigger = Some(Trigger { period, handle });
        info!(every_secs = period.as_secs(), "refresh trigger scheduled");
    }

    /// Clears the trigger registration. A cycle already in flight on the
    /// trigger task is abandoned.
    pub fn shutdown(&self) {
        if let Some(trigger) = self.inner.trigger.lock().take() {
            trigger.handle.abort();
            info!("refresh trigger cleared");
        }
    }

    async fn on_tick(&self) {
        if let Err(e) = self.run_cycle().await {
            error!(error = %e, "refresh cycle failed");
        }
    }

    /// Reads the stored config merged onto the defaults.
    pub async fn load_config(&self) -> Result<MonitorConfig, MonitorError> {
        let stored: Option<MonitorConfigUpdate> =
            store::load(self.inner.store.as_ref(), CONFIG_KEY).await?;

        Ok(match stored {
            Some(update) => MonitorConfig::default().merge(&update),
            None => MonitorConfig::default(),
        })
    }

    /// Runs one fetch -> diff -> notify -> persist -> publish cycle and
    /// returns the published readings.
    ///
    /// # Errors
    /// - `NoValidData` when every fetched reading fails validation; nothing
    ///   is stored or published.
    /// - `Persistence` when the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<Vec<ReadingWithChange>, MonitorError> {
        let config = self.load_config().await?;
        debug!(symbols = ?config.symbols, "refresh cycle started");

        let fetched = self.inner.source.fetch(&config.symbols).await;
        let readings = validate_readings(fetched);
        if readings.is_empty() {
            return Err(MonitorError::NoValidData);
        }

        let prior: Snapshot = store::load(self.inner.store.as_ref(), SNAPSHOT_KEY)
            .await?
            .unwrap_or_default();

        let current = compute_changes(readings, &prior);

        for notification in notifications_for(&current, &prior, &config.notifications) {
            info!(title = %notification.title, "volatility threshold crossed");
            self.inner.notifier.notify(notification).await;
        }

        store::save(self.inner.store.as_ref(), SNAPSHOT_KEY, &current).await?;

        let receivers = self.inner.bus.publish(MonitorEvent::DataUpdated {
            data: current.clone(),
        });
        info!(readings = current.len(), receivers, "refresh cycle completed");

        Ok(current)
    }

    /// First-start setup: stores the default config when none exists,
    /// schedules the trigger and runs one cycle right away.
    ///
    /// A failing first cycle is logged, not returned.
    pub async fn install(&self) -> Result<MonitorConfig, MonitorError> {
        let existing: Option<MonitorConfigUpdate> =
            store::load(self.inner.store.as_ref(), CONFIG_KEY).await?;

        let config = match existing {
            Some(update) => MonitorConfig::default().merge(&update),
            None => {
                let config = MonitorConfig::default();
                store::save(self.inner.store.as_ref(), CONFIG_KEY, &config).await?;
                info!("default config stored");
                config
            }
        };

        self.schedule(config.refresh_interval_seconds);
        self.on_tick().await;

        Ok(config)
    }

    /// Merges `update` into the stored config, persists it, reschedules the
    /// trigger and runs a cycle. A failing cycle is logged, not returned.
    #[instrument(skip(self))]
    pub async fn update_config(
        &self,
        update: &MonitorConfigUpdate,
    ) -> Result<MonitorConfig, MonitorError> {
        let config = self.load_config().await?.merge(update);
        store::save(self.inner.store.as_ref(), CONFIG_KEY, &config).await?;

        self.schedule(config.refresh_interval_seconds);
        self.on_tick().await;

        info!("config updated and applied");
        Ok(config)
    }

    /// Dispatches a request from a display surface or the settings page.
    pub async fn handle_message(&self, request: MonitorRequest) -> MonitorResponse {
        let result = match &request {
            MonitorRequest::GetIvData => self.run_cycle().await.map(|_| ()),
            MonitorRequest::UpdateConfig { config } => self.update_config(config).await.map(|_| ()),
        };

        match result {
            Ok(()) => MonitorResponse::ok(),
            Err(e) => {
                warn!(error = %e, request = ?request, "request failed");
                MonitorResponse::failed(&e)
            }
        }
    }
}
