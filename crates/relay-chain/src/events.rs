//! Settlement contract events.
//!
//! Logs are decoded once, here, into a closed enum. Anything that is not a
//! fill or cancel is ignored.

use alloy::primitives::{B256, U256};
use alloy::sol_types::SolEvent;

use crate::error::{ChainSyncError, ChainSyncResult};
use crate::source::RawLog;

pub mod abi {
    use alloy::sol;

    sol! {
        #[derive(Debug, PartialEq, Eq)]
        event CancelOrder(bytes32 indexed orderHash);

        /// `filled` is cumulative for the order.
        #[derive(Debug, PartialEq, Eq)]
        event OrderStatus(bytes32 indexed orderHash, uint256 filled, uint256 remaining);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementEvent {
    Fill { order_hash: B256, filled: U256 },
    Cancel { order_hash: B256 },
}

impl SettlementEvent {
    /// Topic-0 values of the events the reconciler listens for.
    pub fn signatures() -> Vec<B256> {
        vec![abi::OrderStatus::SIGNATURE_HASH, abi::CancelOrder::SIGNATURE_HASH]
    }

    /// Decode a log.
    ///
    /// `Ok(None)` for logs of other events; `Err` for a log that claims to be
    /// one of ours but does not decode.
    pub fn decode(log: &RawLog) -> ChainSyncResult<Option<Self>> {
        let Some(topic0) = log.topics.first() else {
            return Ok(None);
        };

        let topics = log.topics.iter().copied();
        if *topic0 == abi::OrderStatus::SIGNATURE_HASH {
            let event = abi::OrderStatus::decode_raw_log(topics, &log.data, true)
                .map_err(|e| ChainSyncError::Decode(format!("OrderStatus: {e}")))?;
            Ok(Some(Self::Fill {
                order_hash: event.orderHash,
                filled: event.filled,
            }))
        } else if *topic0 == abi::CancelOrder::SIGNATURE_HASH {
            let event = abi::CancelOrder::decode_raw_log(topics, &log.data, true)
                .map_err(|e| ChainSyncError::Decode(format!("CancelOrder: {e}")))?;
            Ok(Some(Self::Cancel {
                order_hash: event.orderHash,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn order_hash(&self) -> B256 {
        match self {
            Self::Fill { order_hash, .. } | Self::Cancel { order_hash } => *order_hash,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fill { .. } => "fill",
            Self::Cancel { .. } => "cancel",
        }
    }
}
