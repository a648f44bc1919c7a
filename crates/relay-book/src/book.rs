//! Order book facade over a store.
//!
//! Applies query defaults and validates caller-supplied expiry bounds
//! against the wall clock before delegating to the store.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use relay_core::{
    Bound, BookResult, Clock, MarketInfo, OrderHash, QueryArgError, SignedOrder, StoredOrder,
    TokenInfo,
};
use tracing::debug;

use crate::config::QueryLimits;
use crate::store::OrderStore;

#[derive(Clone)]
pub struct OrderBook {
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
    limits: QueryLimits,
}

impl OrderBook {
    pub fn new(store: Arc<dyn OrderStore>, clock: Arc<dyn Clock>, limits: QueryLimits) -> Self {
        Self {
            store,
            clock,
            limits,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_secs()
    }

    pub async fn insert(&self, order: SignedOrder) -> BookResult<()> {
        let hash = order.hash;
        self.store.insert(order).await?;
        debug!(%hash, "Order inserted");
        Ok(())
    }

    /// Orders on the given sides of the book.
    ///
    /// `min_expires` defaults to now, `max_expires` to unbounded. Supplied
    /// bounds must lie within the configured window around now.
    pub async fn query_by_side(
        &self,
        buy_tokens: &[Address],
        sell_tokens: &[Address],
        min_expires: Option<u64>,
        max_expires: Option<u64>,
    ) -> BookResult<Vec<StoredOrder>> {
        let now = self.now();
        if let Some(min) = min_expires {
            self.check_bound("minExpires", min, now)?;
        }
        if let Some(max) = max_expires {
            self.check_bound("maxExpires", max, now)?;
        }

        self.store
            .query_by_side(
                buy_tokens,
                sell_tokens,
                min_expires.unwrap_or(now),
                max_expires,
            )
            .await
    }

    /// Live orders of one maker.
    pub async fn query_by_user(&self, user: Address) -> BookResult<Vec<StoredOrder>> {
        self.store.query_by_user(user, self.now()).await
    }

    pub async fn update_filled(&self, hash: OrderHash, filled_absolute: U256) -> BookResult<bool> {
        self.store.update_filled(hash, filled_absolute).await
    }

    pub async fn remove(&self, hash: OrderHash) -> BookResult<bool> {
        self.store.remove(hash).await
    }

    pub async fn sweep_expired(&self, now: u64) -> BookResult<u64> {
        self.store.sweep_expired(now).await
    }

    pub async fn upsert_token(&self, token: TokenInfo) -> BookResult<()> {
        self.store.upsert_token(token).await
    }

    pub async fn tokens(&self) -> BookResult<Vec<TokenInfo>> {
        self.store.tokens().await
    }

    pub async fn markets(&self) -> BookResult<Vec<MarketInfo>> {
        self.store.markets(self.now()).await
    }

    fn check_bound(&self, arg: &'static str, value: u64, now: u64) -> Result<(), QueryArgError> {
        let lower = now.saturating_sub(self.limits.grace_secs);
        let upper = now.saturating_add(self.limits.max_horizon_secs);

        if value < lower {
            return Err(QueryArgError::OutOfRange {
                arg,
                bound: Bound::BelowMinimum,
                limit: lower,
            });
        }
        if value > upper {
            return Err(QueryArgError::OutOfRange {
                arg,
                bound: Bound::AboveMaximum,
                limit: upper,
            });
        }
        Ok(())
    }
}
