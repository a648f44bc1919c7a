//! Validation configuration.

use serde::{Deserialize, Serialize};

/// Order validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Furthest an expiry may lie in the future (seconds).
    #[serde(default = "default_max_expiry_secs")]
    pub max_expiry_secs: u64,
}

fn default_max_expiry_secs() -> u64 {
    30 * 24 * 60 * 60
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_expiry_secs: default_max_expiry_secs(),
        }
    }
}
