//! Signer error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signer recovery failed: {0}")]
    Recovery(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(#[from] alloy::signers::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SignerResult<T> = Result<T, SignerError>;
