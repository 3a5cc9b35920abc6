//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic business failure with a distinct,
/// machine-checkable meaning. Infrastructure concerns (connectivity, SQL)
/// belong to the storage layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An input field is missing or malformed. `field` names the offender.
    #[error("{field} {message}")]
    Validation { field: &'static str, message: String },

    /// A uniqueness rule was violated at commit time (race not caught by
    /// pre-validation).
    #[error("{0}")]
    Conflict(String),

    /// The referenced account does not exist.
    #[error("not found")]
    NotFound,

    /// A monetary amount did not parse, or was not positive.
    #[error("{0}")]
    InvalidAmount(String),

    /// A withdrawal or transfer exceeds the available balance.
    #[error("insufficient balance")]
    InsufficientFunds,

    /// A malformed request at the operation level (e.g. a transfer naming
    /// the same account twice).
    #[error("{0}")]
    InvalidRequest(String),

    /// Account-number allocation gave up after the bounded retry budget.
    #[error("could not allocate a free account number after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
