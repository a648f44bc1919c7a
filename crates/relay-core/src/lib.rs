//! Core domain types for the order relay.
//!
//! This crate provides the types shared by every other relay crate:
//! - `Order`: the signed trade intent as submitted by a maker
//! - `SignedOrder` / `StoredOrder`: an order with its identity and book state
//! - `TokenInfo`, `MarketInfo`: reference data for market-info responses
//! - `Clock`: injectable wall time
//! - Client-facing error taxonomy (`ValidationError`, `BookError`, `QueryArgError`)

pub mod clock;
pub mod error;
pub mod order;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Bound, BookError, BookResult, QueryArgError, ValidationError};
pub use order::{address_key, Order, OrderHash, SignedOrder, StoredOrder};
pub use token::{MarketInfo, TokenInfo};
