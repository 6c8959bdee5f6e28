use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::monitor::reading::ReadingWithChange;

const DEFAULT_CAPACITY: usize = 64;

/// Events broadcast to display surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorEvent {
    DataUpdated { data: Vec<ReadingWithChange> },
}

/// Fan-out channel for [`MonitorEvent`]s.
///
/// Subscribers see events in publish order. A subscriber that falls more
/// than the channel capacity behind loses the oldest events.
#[derive(Clone)]
pub struct UpdateBus {
    tx: broadcast::Sender<MonitorEvent>,
}

impl UpdateBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }

    /// Publishes `event` and returns how many subscribers received it.
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: MonitorEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("no subscribers for monitor event");
                0
            }
        }
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
