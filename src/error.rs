//! Error types for shellvars.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for sourcing operations.
///
/// The sourced script's own non-zero exit status is never an error; it is
/// reported as data on [`crate::SourceOutcome`]. These variants cover the
/// machinery around the script: dialect configuration, interpreter spawning,
/// and dump parsing.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The shell dialect could not be resolved, or a template is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The interpreter executable does not exist or is not on PATH.
    #[error("interpreter '{0}' not found\nFix: ensure the shell is installed and in PATH, or pass an explicit path.")]
    InterpreterNotFound(String),

    /// The interpreter could not be spawned, timed out, or died on a signal.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The variable dump printed by the wrapper program was malformed.
    #[error("failed to parse variable dump: {0}")]
    Parse(String),
}

impl SourceError {
    /// Returns the appropriate process exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SourceError::Configuration(_) => exit_codes::CONFIGURATION_ERROR,
            SourceError::InterpreterNotFound(_) => exit_codes::INTERPRETER_NOT_FOUND,
            SourceError::Execution(_) => exit_codes::EXECUTION_FAILURE,
            SourceError::Parse(_) => exit_codes::PARSE_FAILURE,
        }
    }
}

/// Result type alias for shellvars operations.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_has_correct_exit_code() {
        let err = SourceError::Configuration("unknown dialect 'posh'".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIGURATION_ERROR);
    }

    #[test]
    fn interpreter_not_found_has_correct_exit_code() {
        let err = SourceError::InterpreterNotFound("bash".to_string());
        assert_eq!(err.exit_code(), exit_codes::INTERPRETER_NOT_FOUND);
    }

    #[test]
    fn execution_error_has_correct_exit_code() {
        let err = SourceError::Execution("spawn failed".to_string());
        assert_eq!(err.exit_code(), exit_codes::EXECUTION_FAILURE);
    }

    #[test]
    fn parse_error_has_correct_exit_code() {
        let err = SourceError::Parse("missing delimiter".to_string());
        assert_eq!(err.exit_code(), exit_codes::PARSE_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = SourceError::Configuration("unknown dialect 'posh'".to_string());
        assert_eq!(err.to_string(), "configuration error: unknown dialect 'posh'");

        let err = SourceError::Parse("unterminated quote".to_string());
        assert_eq!(
            err.to_string(),
            "failed to parse variable dump: unterminated quote"
        );
    }
}
