use std::collections::HashMap;

use async_trait::async_trait;
use chrono_tz::Tz;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::monitor::reading::Reading;
use crate::monitor::source::ReadingSource;

/// How synthetic volatility values are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticPolicy {
    /// Independent uniform draw in `[min, max)` every cycle.
    Uniform { min: f64, max: f64 },
    /// Starts from a uniform draw in `[min, max)`, then moves by at most
    /// `max_step` per cycle and never below `floor`.
    RandomWalk {
        min: f64,
        max: f64,
        max_step: f64,
        floor: f64,
    },
}

impl Default for SyntheticPolicy {
    fn default() -> Self {
        SyntheticPolicy::Uniform {
            min: 10.0,
            max: 40.0,
        }
    }
}

/// Generates readings locally. Never fails.
pub struct SyntheticSource {
    policy: SyntheticPolicy,
    tz: Tz,
    last: Mutex<HashMap<String, f64>>,
}

impl SyntheticSource {
    pub fn new(policy: SyntheticPolicy, tz: Tz) -> Self {
        Self {
            policy,
            tz,
            last: Mutex::new(HashMap::new()),
        }
    }

    fn next_value(&self, symbol: &str, rng: &mut impl Rng) -> f64 {
        match self.policy {
            SyntheticPolicy::Uniform { min, max } => draw(rng, min, max),
            SyntheticPolicy::RandomWalk {
                min,
                max,
                max_step,
                floor,
            } => {
                let mut last = self.last.lock();
                let next = match last.get(symbol) {
                    Some(&previous) => {
                        let step = if max_step > 0.0 {
                            rng.random_range(-max_step..=max_step)
                        } else {
                            0.0
                        };
                        (previous + step).max(floor)
                    }
                    None => draw(rng, min, max).max(floor),
                };
                last.insert(symbol.to_string(), next);
                next
            }
        }
    }
}

fn draw(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if min < max {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[async_trait]
impl ReadingSource for SyntheticSource {
    async fn fetch(&self, symbols: &[String]) -> Vec<Reading> {
        let mut rng = rand::rng();

        let readings: Vec<Reading> = symbols
            .iter()
            .map(|symbol| Reading::new(symbol.clone(), self.next_value(symbol, &mut rng), self.tz))
            .collect();

        debug!(count = readings.len(), "generated synthetic readings");
        readings
    }
}
