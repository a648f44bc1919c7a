//! Storage seam for the order book.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use relay_core::{BookResult, MarketInfo, OrderHash, SignedOrder, StoredOrder, TokenInfo};

/// Persistent store of live orders and token reference data.
///
/// Implementations must make `insert` atomic on the order hash and
/// `update_filled`/`remove` atomic per order. Query results are ordered by
/// expiry ascending, then hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a validated order with `filled = 0`.
    ///
    /// Fails with `BookError::AlreadyExists` if the hash is already stored.
    async fn insert(&self, order: SignedOrder) -> BookResult<()>;

    /// Orders buying any of `buy_tokens` and selling any of `sell_tokens`
    /// with `min_expires <= expires <= max_expires` (unbounded when `None`).
    async fn query_by_side(
        &self,
        buy_tokens: &[Address],
        sell_tokens: &[Address],
        min_expires: u64,
        max_expires: Option<u64>,
    ) -> BookResult<Vec<StoredOrder>>;

    async fn query_by_user(&self, user: Address, min_expires: u64)
        -> BookResult<Vec<StoredOrder>>;

    /// Raise `filled` to `filled_absolute`, capped at the sell amount.
    ///
    /// Returns whether the order exists. Unknown hashes are a no-op.
    async fn update_filled(&self, hash: OrderHash, filled_absolute: U256) -> BookResult<bool>;

    /// Delete an order if present. Returns whether anything was deleted.
    async fn remove(&self, hash: OrderHash) -> BookResult<bool>;

    /// Delete every order with `expires < now`. Returns the number deleted.
    async fn sweep_expired(&self, now: u64) -> BookResult<u64>;

    async fn upsert_token(&self, token: TokenInfo) -> BookResult<()>;

    async fn tokens(&self) -> BookResult<Vec<TokenInfo>>;

    /// Distinct pairs among orders with `expires >= now`.
    async fn markets(&self, now: u64) -> BookResult<Vec<MarketInfo>>;
}
