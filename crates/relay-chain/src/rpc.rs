//! Ethereum JSON-RPC log source over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChainSyncError, ChainSyncResult};
use crate::source::{FilterId, FilterSpec, LogSource, RawLog};

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterParams {
    address: Address,
    from_block: U64,
    /// One position (topic 0) with alternatives.
    topics: Vec<Vec<B256>>,
}

impl From<&FilterSpec> for FilterParams {
    fn from(spec: &FilterSpec) -> Self {
        Self {
            address: spec.address,
            from_block: U64::from(spec.from_block),
            topics: vec![spec.event_signatures.clone()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    transaction_hash: Option<B256>,
    #[serde(default)]
    log_index: Option<U64>,
    #[serde(default)]
    removed: bool,
}

impl From<RpcLog> for RawLog {
    fn from(log: RpcLog) -> Self {
        Self {
            address: log.address,
            topics: log.topics,
            data: log.data,
            block_number: log.block_number.map(|n| n.to::<u64>()),
            transaction_hash: log.transaction_hash,
            log_index: log.log_index.map(|n| n.to::<u64>()),
            removed: log.removed,
        }
    }
}

/// Log source backed by a node's HTTP JSON-RPC endpoint.
pub struct JsonRpcLogSource {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcLogSource {
    /// `timeout` bounds each HTTP request.
    pub fn new(url: impl Into<String>, timeout: Duration) -> ChainSyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainSyncError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<P, R>(&self, method: &str, params: P) -> ChainSyncResult<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainSyncError::Transport(format!("{method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainSyncError::Transport(format!(
                "{method} HTTP {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChainSyncError::Transport(format!("{method} bad response body: {e}")))?;
        debug!(method, "RPC response received");

        parse_response(method, body)
    }
}

fn parse_response<R: DeserializeOwned>(method: &str, body: serde_json::Value) -> ChainSyncResult<R> {
    let response: RpcResponse<R> = serde_json::from_value(body)?;
    if let Some(error) = response.error {
        return Err(ChainSyncError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ChainSyncError::MissingResult(method.to_string()))
}

#[async_trait]
impl LogSource for JsonRpcLogSource {
    async fn latest_block(&self) -> ChainSyncResult<u64> {
        let block: U64 = self.call("eth_blockNumber", Vec::<()>::new()).await?;
        Ok(block.to::<u64>())
    }

    async fn new_filter(&self, spec: &FilterSpec) -> ChainSyncResult<FilterId> {
        self.call("eth_newFilter", [FilterParams::from(spec)]).await
    }

    async fn filter_logs(&self, id: &FilterId) -> ChainSyncResult<Vec<RawLog>> {
        let logs: Vec<RpcLog> = self.call("eth_getFilterLogs", [id]).await?;
        Ok(logs.into_iter().map(RawLog::from).collect())
    }

    async fn filter_changes(&self, id: &FilterId) -> ChainSyncResult<Vec<RawLog>> {
        let logs: Vec<RpcLog> = self.call("eth_getFilterChanges", [id]).await?;
        Ok(logs.into_iter().map(RawLog::from).collect())
    }
}
