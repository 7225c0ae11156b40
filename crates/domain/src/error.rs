//! Domain errors
//!
//! Pure domain errors with no infrastructure dependencies

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid fleet spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid access grant: {0}")]
    InvalidGrant(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
