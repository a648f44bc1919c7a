//! Order validation.
//!
//! Checks a submitted order against the relay's business rules and returns
//! it annotated with its canonical hash. Validation never touches storage;
//! uniqueness is enforced by the book on insert.

pub mod config;
pub mod validator;

pub use config::ValidationConfig;
pub use validator::OrderValidator;
