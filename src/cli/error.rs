//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::traits::StoreError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Http(_) | InfraError::ThreadPool { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(_) => crate::exitcode::DATAERR,
        ApplicationError::NotFound { .. }
        | ApplicationError::StudentNotFound(_)
        | ApplicationError::ModuleNotFound { .. } => crate::exitcode::NOT_FOUND,
        ApplicationError::StudentExists(_) | ApplicationError::NoProgramme(_) => {
            crate::exitcode::USAGE
        }
        ApplicationError::Malformed { .. } => crate::exitcode::DATAERR,
        ApplicationError::Transport { .. } => crate::exitcode::UNAVAILABLE,
        ApplicationError::Store(StoreError::Io { .. }) => crate::exitcode::IOERR,
        ApplicationError::Store(StoreError::Serialization { .. }) => crate::exitcode::DATAERR,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
    }
}
