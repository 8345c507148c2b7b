//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected input and business rule violations.
/// These are independent of catalog transport and storage concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid search keyword {0:?}: at least 3 letters or digits required")]
    InvalidKeyword(String),

    #[error("invalid student id {id:?}: {reason}")]
    InvalidStudentId { id: String, reason: String },

    #[error("invalid name {0:?}: at least 2 characters required")]
    InvalidName(String),

    #[error("invalid grade {0:?}: expected 0-5, pass or fail")]
    InvalidGrade(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
