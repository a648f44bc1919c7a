//! Order types and wire (de)serialization.
//!
//! Amounts are 256-bit integers carried as decimal strings on the wire.
//! `expirationTimeSeconds` is accepted as a string or a number and always
//! written back as a string.

use alloy::hex;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary identity of an order: the EIP-712 signing hash of its fields.
pub type OrderHash = B256;

/// Lowercase `0x`-prefixed form of an address, used as the storage key.
pub fn address_key(address: &Address) -> String {
    hex::encode_prefixed(address.as_slice())
}

/// Order fields as signed by the maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub user: Address,
    pub buy_token: Address,
    pub sell_token: Address,
    #[serde(with = "amount")]
    pub buy_amount: U256,
    #[serde(with = "amount")]
    pub sell_amount: U256,
    #[serde(with = "epoch_seconds")]
    pub expiration_time_seconds: u64,
}

/// An order that passed validation, annotated with its canonical hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub hash: OrderHash,
    pub order: Order,
    pub signature: String,
}

/// An order as held by the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub hash: OrderHash,
    pub order: Order,
    pub signature: String,
    /// Cumulative filled amount on the maker's sell side.
    pub filled: U256,
}

impl StoredOrder {
    /// Fresh book entry for a validated order (`filled = 0`).
    pub fn new(signed: SignedOrder) -> Self {
        Self {
            hash: signed.hash,
            order: signed.order,
            signature: signed.signature,
            filled: U256::ZERO,
        }
    }

    pub fn expires(&self) -> u64 {
        self.order.expiration_time_seconds
    }

    /// Monotonic fill: never decreases, never exceeds the sell amount.
    pub fn apply_fill(&mut self, filled_absolute: U256) {
        self.filled = self
            .filled
            .max(filled_absolute)
            .min(self.order.sell_amount);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// Decimal-string serde for `U256`.
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s
                .trim()
                .parse::<U256>()
                .map_err(|e| serde::de::Error::custom(format!("invalid amount {s:?}: {e}"))),
            StringOrNumber::Number(n) => Ok(U256::from(n)),
        }
    }
}

/// Epoch seconds carried as a string, accepting numbers on input.
pub mod epoch_seconds {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {s:?}: {e}"))),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "user": "0x90F79bf6EB2c4f870365E785982E1f101E93b906",
            "buyToken": "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8",
            "sellToken": "0x82af49447d8a07e3bd95bd0d56f35241523fbab1",
            "buyAmount": "1200000000000000000000",
            "sellAmount": "1000000000000000000",
            "expirationTimeSeconds": "1700000020"
        })
    }

    #[test]
    fn test_order_parses_decimal_strings() {
        let order: Order = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(
            order.buy_amount,
            U256::from(1200u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(order.sell_amount, U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(order.expiration_time_seconds, 1_700_000_020);
    }

    #[test]
    fn test_expiration_accepts_number() {
        let mut value = sample_json();
        value["expirationTimeSeconds"] = json!(1700000020u64);
        let order: Order = serde_json::from_value(value).unwrap();
        assert_eq!(order.expiration_time_seconds, 1_700_000_020);
    }

    #[test]
    fn test_amounts_written_as_decimal_strings() {
        let order: Order = serde_json::from_value(sample_json()).unwrap();
        let out = serde_json::to_value(&order).unwrap();
        assert_eq!(out["buyAmount"], "1200000000000000000000");
        assert_eq!(out["expirationTimeSeconds"], "1700000020");
    }

    #[test]
    fn test_rejects_garbage_amount() {
        let mut value = sample_json();
        value["buyAmount"] = json!("lots");
        assert!(serde_json::from_value::<Order>(value).is_err());
    }

    #[test]
    fn test_address_key_is_lowercase() {
        let order: Order = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(
            address_key(&order.user),
            "0x90f79bf6eb2c4f870365e785982e1f101e93b906"
        );
    }

    #[test]
    fn test_apply_fill_is_monotonic_and_bounded() {
        let order: Order = serde_json::from_value(sample_json()).unwrap();
        let mut stored = StoredOrder::new(SignedOrder {
            hash: B256::repeat_byte(1),
            order,
            signature: "0x".to_string(),
        });

        stored.apply_fill(U256::from(500u64));
        stored.apply_fill(U256::from(500u64));
        assert_eq!(stored.filled, U256::from(500u64));

        stored.apply_fill(U256::from(100u64));
        assert_eq!(stored.filled, U256::from(500u64));

        stored.apply_fill(U256::MAX);
        assert_eq!(stored.filled, stored.order.sell_amount);
    }
}
