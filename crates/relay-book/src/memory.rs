//! In-memory order store.
//!
//! Backed by `DashMap`; per-key entry locking gives the atomicity the
//! store contract requires without a global lock.

use std::collections::BTreeSet;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use relay_core::{
    BookError, BookResult, MarketInfo, OrderHash, SignedOrder, StoredOrder, TokenInfo,
};

use crate::store::OrderStore;

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<OrderHash, StoredOrder>,
    tokens: DashMap<Address, TokenInfo>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, hash: &OrderHash) -> Option<StoredOrder> {
        self.orders.get(hash).map(|o| o.clone())
    }

    fn collect_sorted<F>(&self, keep: F) -> Vec<StoredOrder>
    where
        F: Fn(&StoredOrder) -> bool,
    {
        let mut out: Vec<StoredOrder> = self
            .orders
            .iter()
            .filter(|o| keep(o.value()))
            .map(|o| o.value().clone())
            .collect();
        out.sort_by(|a, b| a.expires().cmp(&b.expires()).then(a.hash.cmp(&b.hash)));
        out
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: SignedOrder) -> BookResult<()> {
        match self.orders.entry(order.hash) {
            Entry::Occupied(_) => Err(BookError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(StoredOrder::new(order));
                Ok(())
            }
        }
    }

    async fn query_by_side(
        &self,
        buy_tokens: &[Address],
        sell_tokens: &[Address],
        min_expires: u64,
        max_expires: Option<u64>,
    ) -> BookResult<Vec<StoredOrder>> {
        let max_expires = max_expires.unwrap_or(u64::MAX);
        Ok(self.collect_sorted(|o| {
            buy_tokens.contains(&o.order.buy_token)
                && sell_tokens.contains(&o.order.sell_token)
                && o.expires() >= min_expires
                && o.expires() <= max_expires
        }))
    }

    async fn query_by_user(
        &self,
        user: Address,
        min_expires: u64,
    ) -> BookResult<Vec<StoredOrder>> {
        Ok(self.collect_sorted(|o| o.order.user == user && o.expires() >= min_expires))
    }

    async fn update_filled(&self, hash: OrderHash, filled_absolute: U256) -> BookResult<bool> {
        match self.orders.get_mut(&hash) {
            Some(mut order) => {
                order.apply_fill(filled_absolute);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, hash: OrderHash) -> BookResult<bool> {
        Ok(self.orders.remove(&hash).is_some())
    }

    async fn sweep_expired(&self, now: u64) -> BookResult<u64> {
        let mut removed = 0u64;
        self.orders.retain(|_, order| {
            let keep = order.expires() >= now;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn upsert_token(&self, token: TokenInfo) -> BookResult<()> {
        self.tokens.insert(token.address, token);
        Ok(())
    }

    async fn tokens(&self) -> BookResult<Vec<TokenInfo>> {
        let mut tokens: Vec<TokenInfo> = self.tokens.iter().map(|t| t.value().clone()).collect();
        tokens.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(tokens)
    }

    async fn markets(&self, now: u64) -> BookResult<Vec<MarketInfo>> {
        let pairs: BTreeSet<(Address, Address)> = self
            .orders
            .iter()
            .filter(|o| o.expires() >= now)
            .map(|o| (o.order.buy_token, o.order.sell_token))
            .collect();

        Ok(pairs
            .into_iter()
            .map(|(buy_token, sell_token)| MarketInfo {
                buy_token,
                sell_token,
                verified: self.tokens.contains_key(&buy_token)
                    && self.tokens.contains_key(&sell_token),
            })
            .collect())
    }
}
