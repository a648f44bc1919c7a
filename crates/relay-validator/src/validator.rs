//! Submitted-order validation.

use std::sync::Arc;

use alloy::primitives::Address;
use relay_core::{Clock, Order, SignedOrder, ValidationError};
use relay_signer::SignatureVerifier;
use tracing::debug;

use crate::config::ValidationConfig;

const EXPIRY_FIELD: &str = "expirationTimeSeconds";

/// Validates orders before they are inserted into the book.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. a signature is present
/// 2. it was produced by `signer` (or `order.user` when no signer is given)
/// 3. the order has not expired
/// 4. the expiry is within the configured horizon
/// 5. the two tokens differ
#[derive(Clone)]
pub struct OrderValidator {
    verifier: SignatureVerifier,
    clock: Arc<dyn Clock>,
    config: ValidationConfig,
}

impl OrderValidator {
    pub fn new(
        verifier: SignatureVerifier,
        clock: Arc<dyn Clock>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            verifier,
            clock,
            config,
        }
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    pub fn validate(
        &self,
        order: Order,
        signature: Option<&str>,
        signer: Option<Address>,
    ) -> Result<SignedOrder, ValidationError> {
        let signature = match signature {
            Some(sig) if !sig.trim().is_empty() => sig,
            _ => return Err(ValidationError::MissingSignature),
        };

        let expected_signer = signer.unwrap_or(order.user);
        if !self
            .verifier
            .verify_order(&order, signature, expected_signer)
        {
            debug!(signer = %expected_signer, "Order signature did not match");
            return Err(ValidationError::BadSignature);
        }

        let now = self.clock.now_secs();
        let expires = order.expiration_time_seconds;
        if expires <= now {
            return Err(ValidationError::BadExpiry {
                field: EXPIRY_FIELD,
                reason: "order is already expired".to_string(),
            });
        }
        if expires > now.saturating_add(self.config.max_expiry_secs) {
            return Err(ValidationError::BadExpiry {
                field: EXPIRY_FIELD,
                reason: format!(
                    "must be within {} seconds from now",
                    self.config.max_expiry_secs
                ),
            });
        }

        if order.buy_token == order.sell_token {
            return Err(ValidationError::SameToken);
        }

        Ok(SignedOrder {
            hash: self.verifier.order_hash(&order),
            order,
            signature: signature.to_string(),
        })
    }
}
