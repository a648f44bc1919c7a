//! EIP-712 order signing and verification for the relay.
//!
//! - `ExchangeDomain`: the settlement contract's EIP-712 domain (config form)
//! - `eip712::Order`: the typed-data schema orders are signed under
//! - `SignatureVerifier`: recovers the signer of a typed-data digest
//! - `OrderSigner`: client-side signing for tooling and tests

pub mod domain;
pub mod error;
pub mod keys;
pub mod verifier;

pub use domain::{eip712, order_hash, order_types_json, ExchangeDomain};
pub use error::{SignerError, SignerResult};
pub use keys::{KeySource, OrderSigner};
pub use verifier::{parse_signature, recover_signer, verify, SignatureVerifier};
