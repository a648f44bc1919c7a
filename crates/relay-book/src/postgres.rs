//! Postgres order store.
//!
//! Atomicity comes from the database: the primary key on `hash` with
//! `ON CONFLICT DO NOTHING` for inserts, and single-statement updates for
//! fills and deletes.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use relay_core::{
    address_key, BookError, BookResult, MarketInfo, Order, OrderHash, SignedOrder, StoredOrder,
    TokenInfo,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::schema::BOOTSTRAP;
use crate::store::OrderStore;

const ORDER_COLUMNS: &str = r#"
    hash,
    user_address,
    buy_token,
    sell_token,
    CAST(buy_amount AS TEXT) AS buy_amount,
    CAST(sell_amount AS TEXT) AS sell_amount,
    CAST(filled AS TEXT) AS filled,
    expires,
    sig
"#;

fn storage(e: sqlx::Error) -> BookError {
    BookError::Storage(e.to_string())
}

fn hash_key(hash: &OrderHash) -> String {
    alloy::hex::encode_prefixed(hash.as_slice())
}

fn epoch(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

fn parse_column<T>(row: &PgRow, column: &str) -> BookResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column).map_err(storage)?;
    raw.parse::<T>()
        .map_err(|e| BookError::Storage(format!("bad {column} value {raw:?}: {e}")))
}

fn order_from_row(row: &PgRow) -> BookResult<StoredOrder> {
    let expires: i64 = row.try_get("expires").map_err(storage)?;
    Ok(StoredOrder {
        hash: parse_column::<B256>(row, "hash")?,
        order: Order {
            user: parse_column::<Address>(row, "user_address")?,
            buy_token: parse_column::<Address>(row, "buy_token")?,
            sell_token: parse_column::<Address>(row, "sell_token")?,
            buy_amount: parse_column::<U256>(row, "buy_amount")?,
            sell_amount: parse_column::<U256>(row, "sell_amount")?,
            expiration_time_seconds: expires.max(0) as u64,
        },
        signature: row.try_get("sig").map_err(storage)?,
        filled: parse_column::<U256>(row, "filled")?,
    })
}

fn token_from_row(row: &PgRow) -> BookResult<TokenInfo> {
    let decimals: i16 = row.try_get("token_decimals").map_err(storage)?;
    Ok(TokenInfo {
        address: parse_column::<Address>(row, "token_address")?,
        symbol: row.try_get("token_symbol").map_err(storage)?,
        name: row.try_get("token_name").map_err(storage)?,
        decimals: u8::try_from(decimals)
            .map_err(|e| BookError::Storage(format!("bad token_decimals {decimals}: {e}")))?,
    })
}

/// Order store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> BookResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(storage)?;
        info!(max_connections, "Connected to Postgres");
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist.
    pub async fn bootstrap(&self) -> BookResult<()> {
        for statement in BOOTSTRAP {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(storage)?;
        }
        debug!("Order book schema ready");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, signed: SignedOrder) -> BookResult<()> {
        let order = &signed.order;
        let result = sqlx::query(
            r#"
            INSERT INTO orders
                (hash, user_address, buy_token, sell_token, buy_amount, sell_amount, expires, sig)
            VALUES
                ($1, $2, $3, $4, CAST($5 AS NUMERIC), CAST($6 AS NUMERIC), $7, $8)
            ON CONFLICT (hash) DO NOTHING
            "#,
        )
        .bind(hash_key(&signed.hash))
        .bind(address_key(&order.user))
        .bind(address_key(&order.buy_token))
        .bind(address_key(&order.sell_token))
        .bind(order.buy_amount.to_string())
        .bind(order.sell_amount.to_string())
        .bind(epoch(order.expiration_time_seconds))
        .bind(&signed.signature)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(BookError::AlreadyExists);
        }
        Ok(())
    }

    async fn query_by_side(
        &self,
        buy_tokens: &[Address],
        sell_tokens: &[Address],
        min_expires: u64,
        max_expires: Option<u64>,
    ) -> BookResult<Vec<StoredOrder>> {
        let buy: Vec<String> = buy_tokens.iter().map(address_key).collect();
        let sell: Vec<String> = sell_tokens.iter().map(address_key).collect();

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE buy_token = ANY($1)
              AND sell_token = ANY($2)
              AND expires >= $3
              AND expires <= $4
            ORDER BY expires ASC, hash ASC
            "#
        ))
        .bind(buy)
        .bind(sell)
        .bind(epoch(min_expires))
        .bind(max_expires.map(epoch).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(order_from_row).collect()
    }

    async fn query_by_user(
        &self,
        user: Address,
        min_expires: u64,
    ) -> BookResult<Vec<StoredOrder>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_address = $1
              AND expires >= $2
            ORDER BY expires ASC, hash ASC
            "#
        ))
        .bind(address_key(&user))
        .bind(epoch(min_expires))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(order_from_row).collect()
    }

    async fn update_filled(&self, hash: OrderHash, filled_absolute: U256) -> BookResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET filled = LEAST(GREATEST(filled, CAST($2 AS NUMERIC)), sell_amount)
            WHERE hash = $1
            "#,
        )
        .bind(hash_key(&hash))
        .bind(filled_absolute.to_string())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, hash: OrderHash) -> BookResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE hash = $1")
            .bind(hash_key(&hash))
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self, now: u64) -> BookResult<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE expires < $1")
            .bind(epoch(now))
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected())
    }

    async fn upsert_token(&self, token: TokenInfo) -> BookResult<()> {
        sqlx::query(
            r#"
            INSERT INTO token_info (token_address, token_symbol, token_name, token_decimals)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_address) DO UPDATE SET
                token_symbol = EXCLUDED.token_symbol,
                token_name = EXCLUDED.token_name,
                token_decimals = EXCLUDED.token_decimals
            "#,
        )
        .bind(address_key(&token.address))
        .bind(&token.symbol)
        .bind(&token.name)
        .bind(i16::from(token.decimals))
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn tokens(&self) -> BookResult<Vec<TokenInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT token_address, token_symbol, token_name, token_decimals
            FROM token_info
            ORDER BY token_address
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(token_from_row).collect()
    }

    async fn markets(&self, now: u64) -> BookResult<Vec<MarketInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT
                o.buy_token,
                o.sell_token,
                (bt.token_address IS NOT NULL AND st.token_address IS NOT NULL) AS verified
            FROM orders o
            LEFT JOIN token_info bt ON bt.token_address = o.buy_token
            LEFT JOIN token_info st ON st.token_address = o.sell_token
            WHERE o.expires >= $1
            ORDER BY o.buy_token, o.sell_token
            "#,
        )
        .bind(epoch(now))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter()
            .map(|row| {
                Ok(MarketInfo {
                    buy_token: parse_column::<Address>(row, "buy_token")?,
                    sell_token: parse_column::<Address>(row, "sell_token")?,
                    verified: row.try_get("verified").map_err(storage)?,
                })
            })
            .collect()
    }
}
