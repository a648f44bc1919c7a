//! Capped exponential backoff with jitter.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter is drawn uniformly from `0..=max_jitter_ms`.
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_max_jitter_ms() -> u64 {
    1_000
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

/// Source of jitter: given the max, returns a value in `0..=max`.
pub type JitterFn = Arc<dyn Fn(u64) -> u64 + Send + Sync>;

#[derive(Clone)]
pub struct BackoffPolicy {
    config: BackoffConfig,
    jitter: JitterFn,
}

impl BackoffPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self::with_jitter(config, Arc::new(random_jitter))
    }

    pub fn with_jitter(config: BackoffConfig, jitter: JitterFn) -> Self {
        Self { config, jitter }
    }

    /// Policy whose delays are exactly the capped exponential.
    pub fn without_jitter(config: BackoffConfig) -> Self {
        Self::with_jitter(config, Arc::new(|_| 0))
    }

    /// Delay before retry number `attempt` (1-based).
    ///
    /// `min(base * 2^(attempt-1), max) + jitter`
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.config.max_delay_ms);
        let jitter = (self.jitter)(self.config.max_jitter_ms).min(self.config.max_jitter_ms);
        Duration::from_millis(delay.saturating_add(jitter))
    }
}

fn random_jitter(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=max)
}
