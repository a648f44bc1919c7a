//! Signature verification over EIP-712 digests.
//!
//! Signatures are 65-byte `r || s || v` hex strings. `v` may be a raw
//! recovery id (0/1) or the legacy 27/28 form produced by most wallets.
//! Any failure to parse or recover counts as "not signed by that address".

use alloy::primitives::{Address, PrimitiveSignature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use tracing::debug;

use crate::domain::eip712;
use crate::error::{SignerError, SignerResult};

/// Parse a 65-byte hex signature.
pub fn parse_signature(signature: &str) -> SignerResult<PrimitiveSignature> {
    let bytes = hex::decode(signature.trim().trim_start_matches("0x"))?;
    if bytes.len() != 65 {
        return Err(SignerError::MalformedSignature(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let y_parity = match bytes[64] {
        0 | 27 => false,
        1 | 28 => true,
        v => {
            return Err(SignerError::MalformedSignature(format!(
                "invalid recovery id {v}"
            )))
        }
    };

    let r = U256::from_be_slice(&bytes[..32]);
    let s = U256::from_be_slice(&bytes[32..64]);
    Ok(PrimitiveSignature::new(r, s, y_parity))
}

/// Recover the address that signed `digest`.
pub fn recover_signer(digest: &B256, signature: &str) -> SignerResult<Address> {
    parse_signature(signature)?
        .recover_address_from_prehash(digest)
        .map_err(|e| SignerError::Recovery(e.to_string()))
}

/// Check that `message` under `domain` was signed by `expected_signer`.
///
/// The type schema is the `SolStruct` implementation of `T`.
pub fn verify<T: SolStruct>(
    domain: &Eip712Domain,
    message: &T,
    signature: &str,
    expected_signer: Address,
) -> bool {
    let digest = message.eip712_signing_hash(domain);
    match recover_signer(&digest, signature) {
        Ok(recovered) => recovered == expected_signer,
        Err(e) => {
            debug!(error = %e, "Signature rejected");
            false
        }
    }
}

/// Verifier bound to the exchange domain.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    domain: Eip712Domain,
}

impl SignatureVerifier {
    pub fn new(domain: Eip712Domain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Canonical order hash (the EIP-712 signing hash).
    pub fn order_hash(&self, order: &relay_core::Order) -> B256 {
        eip712::Order::from(order).eip712_signing_hash(&self.domain)
    }

    pub fn verify<T: SolStruct>(
        &self,
        message: &T,
        signature: &str,
        expected_signer: Address,
    ) -> bool {
        verify(&self.domain, message, signature, expected_signer)
    }

    pub fn verify_order(
        &self,
        order: &relay_core::Order,
        signature: &str,
        expected_signer: Address,
    ) -> bool {
        self.verify(&eip712::Order::from(order), signature, expected_signer)
    }
}
