use std::collections::HashMap;
use std::fmt;

use crate::monitor::config::NotificationSettings;
use crate::monitor::notifier::Notification;
use crate::monitor::reading::{Reading, ReadingWithChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn of(change_percent: f64) -> Self {
        if change_percent >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Prior volatility per symbol, limited to values usable as a baseline
/// (finite and positive). The first entry for a symbol wins.
fn baselines(prior: &[ReadingWithChange]) -> HashMap<&str, f64> {
    let mut baselines = HashMap::with_capacity(prior.len());
    for item in prior {
        let iv = item.reading.implied_volatility;
        if iv.is_finite() && iv > 0.0 {
            baselines.entry(item.reading.symbol.as_str()).or_insert(iv);
        }
    }
    baselines
}

/// Attaches the move against `prior` to every current reading.
///
/// A symbol with no prior reading, or whose prior volatility is not
/// positive, gets a change of exactly zero.
pub fn compute_changes(current: Vec<Reading>, prior: &[ReadingWithChange]) -> Vec<ReadingWithChange> {
    let baselines = baselines(prior);

    current
        .into_iter()
        .map(|reading| {
            let (change, change_percent) = match baselines.get(reading.symbol.as_str()) {
                Some(&prior_iv) => {
                    let change = reading.implied_volatility - prior_iv;
                    (change, change / prior_iv * 100.0)
                }
                None => (0.0, 0.0),
            };

            ReadingWithChange {
                reading,
                change,
                change_percent,
            }
        })
        .collect()
}

/// Builds one notification per reading whose move reaches the threshold.
///
/// Only symbols with a usable baseline in `prior` qualify, so a first
/// sighting never fires, even under a zero threshold.
pub fn notifications_for(
    readings: &[ReadingWithChange],
    prior: &[ReadingWithChange],
    settings: &NotificationSettings,
) -> Vec<Notification> {
    if !settings.enabled {
        return Vec::new();
    }

    let baselines = baselines(prior);

    readings
        .iter()
        .filter(|item| {
            baselines.contains_key(item.reading.symbol.as_str())
                && item.change_percent.abs() >= settings.threshold_percent
        })
        .map(alert_for)
        .collect()
}

fn alert_for(item: &ReadingWithChange) -> Notification {
    let direction = Direction::of(item.change_percent);

    Notification {
        title: format!("{} implied volatility {} alert", item.reading.symbol, direction),
        message: format!(
            "Current implied volatility: {:.2}%\nChange: {:.2}%",
            item.reading.implied_volatility,
            item.change_percent.abs()
        ),
    }
}
