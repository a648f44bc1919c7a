//! Book configuration.

use serde::{Deserialize, Serialize};

/// Window that explicit query bounds must fall in, relative to now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimits {
    /// How far in the past `minExpires`/`maxExpires` may lie (seconds).
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
    /// How far in the future `minExpires`/`maxExpires` may lie (seconds).
    #[serde(default = "default_max_horizon_secs")]
    pub max_horizon_secs: u64,
}

fn default_grace_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_horizon_secs() -> u64 {
    365 * 24 * 60 * 60
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            grace_secs: default_grace_secs(),
            max_horizon_secs: default_max_horizon_secs(),
        }
    }
}

/// Expiry sweeper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    2_000
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}
