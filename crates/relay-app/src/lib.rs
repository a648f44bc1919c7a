//! Order relay application wiring.
//!
//! Builds the book, validator, HTTP API, expiry sweeper and one event
//! reconciler per configured chain, and runs them until shutdown.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, DatabaseConfig, ExchangeConfig};
pub use error::{AppError, AppResult};
