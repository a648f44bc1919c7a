//! Chain sync error types.
//!
//! Never surfaced to API clients; the reconciler logs these and retries.

use relay_core::BookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainSyncError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC response for {0} has no result")]
    MissingResult(String),

    #[error("{op} timed out after {after_ms}ms")]
    Timeout { op: &'static str, after_ms: u64 },

    #[error("Event decode failed: {0}")]
    Decode(String),

    #[error("Order book error: {0}")]
    Book(#[from] BookError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ChainSyncResult<T> = Result<T, ChainSyncError>;
