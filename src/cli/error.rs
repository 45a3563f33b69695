//! CLI-level errors (wraps infrastructure errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("no such document: {}", .0.display())]
    MissingInput(PathBuf),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::MissingInput(_) => crate::exitcode::NOINPUT,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_) | ApplicationError::Document { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, NodeId};

    #[test]
    fn given_layered_errors_when_mapping_then_sysexits_codes() {
        let dup = CliError::from(ApplicationError::Domain(DomainError::DuplicateId(NodeId::from("a"))));
        assert_eq!(dup.exit_code(), crate::exitcode::DATAERR);

        let cfg = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(cfg.exit_code(), crate::exitcode::CONFIG);

        let missing = CliError::MissingInput(PathBuf::from("tree.json"));
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(missing.to_string(), "no such document: tree.json");
    }
}
