//! Per-chain configuration.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::backoff::BackoffConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Label used in logs and metrics.
    pub name: String,
    /// JSON-RPC endpoint of a node on this chain.
    pub rpc_url: String,
    /// Settlement contract emitting fill and cancel events.
    pub exchange_address: Address,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Blocks replayed when a filter is (re)created.
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
    /// Upper bound on every event-source call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_lookback_blocks() -> u64 {
    1_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl ChainConfig {
    pub fn new(name: impl Into<String>, rpc_url: impl Into<String>, exchange_address: Address) -> Self {
        Self {
            name: name.into(),
            rpc_url: rpc_url.into(),
            exchange_address,
            poll_interval_ms: default_poll_interval_ms(),
            lookback_blocks: default_lookback_blocks(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff: BackoffConfig::default(),
        }
    }
}
