//! Postgres schema bootstrap.
//!
//! Amounts are `NUMERIC(78, 0)`, wide enough for any `uint256`. Addresses
//! and hashes are lowercase `0x`-hex text.

pub const CREATE_ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    hash         TEXT PRIMARY KEY,
    user_address TEXT NOT NULL,
    buy_token    TEXT NOT NULL,
    sell_token   TEXT NOT NULL,
    buy_amount   NUMERIC(78, 0) NOT NULL,
    sell_amount  NUMERIC(78, 0) NOT NULL,
    filled       NUMERIC(78, 0) NOT NULL DEFAULT 0,
    expires      BIGINT NOT NULL,
    sig          TEXT NOT NULL
)
"#;

pub const CREATE_ORDERS_SIDE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS orders_side_idx ON orders (buy_token, sell_token, expires)
"#;

pub const CREATE_ORDERS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS orders_user_idx ON orders (user_address, expires)
"#;

pub const CREATE_TOKEN_INFO: &str = r#"
CREATE TABLE IF NOT EXISTS token_info (
    token_address  TEXT PRIMARY KEY,
    token_symbol   TEXT NOT NULL,
    token_name     TEXT NOT NULL,
    token_decimals SMALLINT NOT NULL
)
"#;

/// Statements run in order at startup.
pub const BOOTSTRAP: &[&str] = &[
    CREATE_ORDERS,
    CREATE_ORDERS_SIDE_INDEX,
    CREATE_ORDERS_USER_INDEX,
    CREATE_TOKEN_INFO,
];
