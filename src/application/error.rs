//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::{StoreError, TransportError};

/// A catalog record that could not be turned into a node or course.
///
/// Reported for that single record only; callers decide whether to prune the
/// branch or surface the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("record is empty")]
    Empty,

    #[error("missing or invalid field: {0}")]
    MissingField(String),

    #[error("unknown record type: {0}")]
    UnknownRecordType(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() {
            ParseError::MissingField(e.to_string())
        } else {
            ParseError::InvalidJson(e.to_string())
        }
    }
}

/// Application errors wrap domain errors and add catalog/store context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{kind} not found in catalog: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("malformed {kind} record {id}: {source}")]
    Malformed {
        kind: &'static str,
        id: String,
        #[source]
        source: ParseError,
    },

    #[error("catalog request failed: {context}")]
    Transport {
        context: String,
        #[source]
        source: TransportError,
    },

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("student already exists: {0}")]
    StudentExists(String),

    #[error("student {0} has no degree programme")]
    NoProgramme(String),

    #[error("module {module} not found in programme of student {student}")]
    ModuleNotFound { student: String, module: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True when the catalog simply has no such record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplicationError::NotFound { .. })
    }

    /// True when the request never completed (network, HTTP status, ...).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApplicationError::Transport { .. })
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
