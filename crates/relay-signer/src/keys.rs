//! Key loading and client-side order signing.
//!
//! Used by the `sign-order` tool and tests. The relay itself never holds
//! a private key.
//!
//! Security notes:
//! - Secret bytes are zeroized after the signer is built.
//! - Never log private key material.

use std::path::PathBuf;

use alloy::hex as alloy_hex;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use alloy::sol_types::Eip712Domain;
use zeroize::Zeroizing;

use crate::domain::order_hash;
use crate::error::{SignerError, SignerResult};

/// Source of the private key.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (recommend 0600 permissions).
    File { path: PathBuf },
}

/// Signs orders the way a wallet's `signTypedData` would.
pub struct OrderSigner {
    signer: PrivateKeySigner,
    domain: Eip712Domain,
}

impl OrderSigner {
    /// Load a key from `source`.
    ///
    /// # Errors
    /// Returns `SignerError` if the variable or file is missing, the hex is
    /// malformed, or the key is not a valid secp256k1 scalar.
    pub fn load(source: &KeySource, domain: Eip712Domain) -> SignerResult<Self> {
        let raw = match source {
            KeySource::EnvVar { var_name } => Zeroizing::new(
                std::env::var(var_name)
                    .map_err(|_| SignerError::EnvVarNotFound(var_name.clone()))?,
            ),
            KeySource::File { path } => Zeroizing::new(std::fs::read_to_string(path)?),
        };
        let secret_bytes = Zeroizing::new(hex::decode(raw.trim().trim_start_matches("0x"))?);
        Self::from_bytes(&secret_bytes, domain)
    }

    pub fn from_bytes(secret_bytes: &[u8], domain: Eip712Domain) -> SignerResult<Self> {
        let signer = PrivateKeySigner::from_slice(secret_bytes)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { signer, domain })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an order; returns the `0x`-prefixed 65-byte signature (v = 27/28).
    pub async fn sign_order(&self, order: &relay_core::Order) -> SignerResult<String> {
        let digest = order_hash(&self.domain, order);
        let signature = self.signer.sign_hash(&digest).await?;
        Ok(alloy_hex::encode_prefixed(signature.as_bytes()))
    }
}
