//! Order book for the relay.
//!
//! - `OrderStore`: storage seam, with in-memory and Postgres backends
//! - `OrderBook`: query defaults and bound checks over a store
//! - `ExpirySweeper`: periodic removal of expired orders
//!
//! The store is the only synchronization point between request handlers,
//! chain reconcilers and the sweeper. Every backend provides atomic
//! uniqueness on the order hash and atomic single-order updates.

pub mod book;
pub mod config;
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;
pub mod sweeper;

pub use book::OrderBook;
pub use config::{QueryLimits, SweeperConfig};
pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;
pub use store::OrderStore;
pub use sweeper::ExpirySweeper;
