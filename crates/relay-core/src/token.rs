//! Token reference data and market listings.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Token metadata, seeded outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// A traded pair with live orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub buy_token: Address,
    pub sell_token: Address,
    /// Both tokens are known in `token_info`.
    pub verified: bool,
}
