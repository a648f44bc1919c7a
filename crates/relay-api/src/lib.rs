//! HTTP API for the order relay.
//!
//! Routes:
//! - `POST /v1/order`: submit a signed order
//! - `GET /v1/orders`: orders by token sides and expiry window
//! - `GET /v1/user`: live orders of one maker
//! - `GET /v1/markets`: live pairs, known tokens and exchange signing info
//! - `GET /metrics`, `GET /health`
//!
//! Every failure is `400 {"err": message}`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use server::{create_router, run_server};
pub use state::ApiState;
pub use types::ExchangeInfo;
