//! Settlement-layer event reconciliation.
//!
//! One `EventReconciler` per chain keeps a log filter installed on the
//! settlement contract and applies decoded fill/cancel events to the order
//! book. Delivery is at-least-once; every apply is idempotent.

pub mod backoff;
pub mod config;
pub mod error;
pub mod events;
pub mod reconciler;
pub mod rpc;
pub mod source;

pub use backoff::{BackoffConfig, BackoffPolicy};
pub use config::ChainConfig;
pub use error::{ChainSyncError, ChainSyncResult};
pub use events::SettlementEvent;
pub use reconciler::EventReconciler;
pub use rpc::JsonRpcLogSource;
pub use source::{FilterId, FilterSpec, LogSource, RawLog};
