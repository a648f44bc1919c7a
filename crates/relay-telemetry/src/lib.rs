//! Prometheus metrics and structured logging for the order relay.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus metrics for submissions, expiry sweeps and chain sync
//! - Text exposition for the `/metrics` endpoint

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::{encode_text, Metrics};
