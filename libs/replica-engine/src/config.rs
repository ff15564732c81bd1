use std::time::Duration;

use serde::Deserialize;

/// `[consumer]` секция: параметры polling loop'а.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Максимум событий за один poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Через сколько секунд неподтверждённое событие снова станет pending.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_batch_size() -> usize {
    5
}
fn default_ttl_secs() -> u64 {
    10
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl ConsumerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
