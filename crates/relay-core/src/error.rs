//! Error types shared across the relay.
//!
//! Every variant here is client-facing: its `Display` text is what the API
//! returns in `{"err": ...}`.

use std::fmt;
use thiserror::Error;

/// Reasons a submitted order is rejected before it reaches the book.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing signature")]
    MissingSignature,

    #[error("Bad signature. You might need the signer field")]
    BadSignature,

    #[error("Bad {field}: {reason}")]
    BadExpiry { field: &'static str, reason: String },

    #[error("Can't buy and sell the same token")]
    SameToken,
}

/// Which side of the allowed window a query bound violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    BelowMinimum,
    AboveMaximum,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowMinimum => write!(f, "below the minimum allowed"),
            Self::AboveMaximum => write!(f, "above the maximum allowed"),
        }
    }
}

/// Bad arguments to a book query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryArgError {
    #[error("Missing query arg {0}")]
    Missing(&'static str),

    #[error("Bad query arg {arg}: {reason}")]
    Invalid { arg: &'static str, reason: String },

    #[error("{arg} is {bound} ({limit})")]
    OutOfRange {
        arg: &'static str,
        bound: Bound,
        limit: u64,
    },
}

/// Order book errors.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("Order already exists")]
    AlreadyExists,

    #[error(transparent)]
    Query(#[from] QueryArgError),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type BookResult<T> = Result<T, BookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_message() {
        assert!(BookError::AlreadyExists
            .to_string()
            .contains("already exists"));
    }

    #[test]
    fn test_bad_expiry_names_field() {
        let err = ValidationError::BadExpiry {
            field: "expirationTimeSeconds",
            reason: "must be in the future".to_string(),
        };
        assert!(err.to_string().contains("expirationTimeSeconds"));
    }

    #[test]
    fn test_out_of_range_names_bound_and_direction() {
        let err = QueryArgError::OutOfRange {
            arg: "maxExpires",
            bound: Bound::AboveMaximum,
            limit: 100,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("maxExpires"));
        assert!(msg.contains("above the maximum"));

        let err = QueryArgError::OutOfRange {
            arg: "minExpires",
            bound: Bound::BelowMinimum,
            limit: 100,
        };
        assert!(err.to_string().contains("below the minimum"));
    }

    #[test]
    fn test_query_error_passes_through_book_error() {
        let err: BookError = QueryArgError::Missing("buyToken").into();
        assert_eq!(err.to_string(), "Missing query arg buyToken");
    }
}
