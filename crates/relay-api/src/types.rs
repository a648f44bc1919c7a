//! Request and response bodies.

use alloy::primitives::{Address, B256};
use relay_core::{address_key, MarketInfo, Order, StoredOrder, TokenInfo};
use relay_signer::{order_types_json, ExchangeDomain};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub order: Order,
    #[serde(default)]
    pub signature: Option<String>,
    /// Address that signed on behalf of `order.user`.
    #[serde(default)]
    pub signer: Option<Address>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    pub hash: B256,
}

/// Query string of `GET /v1/orders`. Values are parsed by the handler so
/// that errors name the offending argument.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub buy_token: Option<String>,
    pub sell_token: Option<String>,
    pub min_expires: Option<String>,
    pub max_expires: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub address: Option<String>,
}

/// Order fields as returned to clients, addresses lowercase.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    pub user: String,
    pub buy_token: String,
    pub sell_token: String,
    pub buy_amount: String,
    pub sell_amount: String,
    pub expiration_time_seconds: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_amount: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderView {
    pub hash: B256,
    pub order: OrderBody,
    pub signature: String,
}

impl OrderView {
    pub fn new(stored: StoredOrder, include_filled: bool) -> Self {
        let order = &stored.order;
        Self {
            hash: stored.hash,
            order: OrderBody {
                user: address_key(&order.user),
                buy_token: address_key(&order.buy_token),
                sell_token: address_key(&order.sell_token),
                buy_amount: order.buy_amount.to_string(),
                sell_amount: order.sell_amount.to_string(),
                expiration_time_seconds: order.expiration_time_seconds.to_string(),
                fill_amount: include_filled.then(|| stored.filled.to_string()),
            },
            signature: stored.signature,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketView {
    pub buy_token: String,
    pub sell_token: String,
    pub verified: bool,
}

impl From<MarketInfo> for MarketView {
    fn from(market: MarketInfo) -> Self {
        Self {
            buy_token: address_key(&market.buy_token),
            sell_token: address_key(&market.sell_token),
            verified: market.verified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenView {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl From<TokenInfo> for TokenView {
    fn from(token: TokenInfo) -> Self {
        Self {
            address: address_key(&token.address),
            symbol: token.symbol,
            name: token.name,
            decimals: token.decimals,
        }
    }
}

/// What clients need to sign orders for this relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub exchange_address: String,
    pub domain: ExchangeDomain,
    pub types: serde_json::Value,
}

impl ExchangeInfo {
    pub fn new(exchange_address: Address, domain: ExchangeDomain) -> Self {
        Self {
            exchange_address: address_key(&exchange_address),
            domain,
            types: order_types_json(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketsResponse {
    pub markets: Vec<MarketView>,
    pub verified_tokens: Vec<TokenView>,
    pub exchange: ExchangeInfo,
}
