use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Inclusive range of whole seconds, written as `[lo, hi]` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "[u64; 2]", into = "[u64; 2]")]
pub struct WaitRange {
    min_secs: u64,
    max_secs: u64,
}

impl WaitRange {
    pub fn new(min_secs: u64, max_secs: u64) -> Result<Self> {
        if min_secs > max_secs {
            return Err(anyhow::anyhow!(
                "Invalid wait range [{}, {}]: lower bound is above upper bound",
                min_secs,
                max_secs
            ));
        }
        Ok(Self { min_secs, max_secs })
    }

    /// A range that never waits. Handy for tests and dry configs.
    pub fn zero() -> Self {
        Self {
            min_secs: 0,
            max_secs: 0,
        }
    }

    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

impl TryFrom<[u64; 2]> for WaitRange {
    type Error = anyhow::Error;

    fn try_from(value: [u64; 2]) -> Result<Self> {
        Self::new(value[0], value[1])
    }
}

impl From<WaitRange> for [u64; 2] {
    fn from(range: WaitRange) -> Self {
        [range.min_secs, range.max_secs]
    }
}

/// Sleeps for a random duration inside `range` and returns how long it slept.
pub async fn sleep_random(range: WaitRange) -> Duration {
    let delay = range.sample();
    if !delay.is_zero() {
        info!("💤 Sleeping for {} seconds...", delay.as_secs());
        sleep(delay).await;
    }
    delay
}
