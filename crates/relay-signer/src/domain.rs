//! Exchange EIP-712 domain and the order typed-data schema.
//!
//! Orders are signed with `eth_signTypedData_v4` under the settlement
//! contract's domain. The order hash used as the book's primary key is the
//! EIP-712 signing hash: `keccak256(0x1901 || domain_separator || struct_hash)`.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod eip712 {
    use alloy::sol;

    // Field order is part of the type hash; it must match the contract.
    sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Order {
            address user;
            address sellToken;
            address buyToken;
            uint256 sellAmount;
            uint256 buyAmount;
            uint256 expirationTimeSeconds;
        }
    }
}

impl From<&relay_core::Order> for eip712::Order {
    fn from(order: &relay_core::Order) -> Self {
        Self {
            user: order.user,
            sellToken: order.sell_token,
            buyToken: order.buy_token,
            sellAmount: order.sell_amount,
            buyAmount: order.buy_amount,
            expirationTimeSeconds: U256::from(order.expiration_time_seconds),
        }
    }
}

/// EIP-712 domain of the settlement contract, in config form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Default for ExchangeDomain {
    fn default() -> Self {
        Self {
            name: "ZigZag".to_string(),
            version: "2.1".to_string(),
            chain_id: 42161,
            verifying_contract: Address::ZERO,
        }
    }
}

impl ExchangeDomain {
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

/// The `types` object clients pass to `signTypedData` for orders.
pub fn order_types_json() -> serde_json::Value {
    json!({
        "Order": [
            { "name": "user", "type": "address" },
            { "name": "sellToken", "type": "address" },
            { "name": "buyToken", "type": "address" },
            { "name": "sellAmount", "type": "uint256" },
            { "name": "buyAmount", "type": "uint256" },
            { "name": "expirationTimeSeconds", "type": "uint256" }
        ]
    })
}

/// Canonical hash of an order under `domain`.
pub fn order_hash(domain: &Eip712Domain, order: &relay_core::Order) -> B256 {
    eip712::Order::from(order).eip712_signing_hash(domain)
}
