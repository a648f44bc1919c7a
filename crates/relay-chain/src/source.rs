//! Event-log source abstraction.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::error::ChainSyncResult;

/// Opaque filter handle issued by the node.
pub type FilterId = String;

/// A log entry as delivered by the node, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<u64>,
    /// Set when a reorg dropped the block this entry came from.
    pub removed: bool,
}

/// What a filter matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub address: Address,
    /// Accepted values of topic 0.
    pub event_signatures: Vec<B256>,
    pub from_block: u64,
}

/// Poll-based access to a chain's event log.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn latest_block(&self) -> ChainSyncResult<u64>;

    async fn new_filter(&self, spec: &FilterSpec) -> ChainSyncResult<FilterId>;

    /// Every log matching the filter from its start block.
    async fn filter_logs(&self, id: &FilterId) -> ChainSyncResult<Vec<RawLog>>;

    /// Logs matching the filter since the previous poll.
    async fn filter_changes(&self, id: &FilterId) -> ChainSyncResult<Vec<RawLog>>;
}
