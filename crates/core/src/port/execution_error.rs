// Execution errors
//
// Every failure of an execute call is one of these variants. Nothing is retried.

use thiserror::Error;

use crate::domain::DomainError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// Source does not parse; raised before any process is touched
    #[error("Syntax error: {0}")]
    SyntaxParse(String),

    /// Source parses but references a denied name or a disallowed module
    #[error("Unsafe code: {0}")]
    UnsafeCode(String),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    /// Wall-clock budget exceeded; carries elapsed seconds at detection
    #[error("Process timeout after {0:.3}s")]
    Timeout(f64),

    /// Forced termination failed; logged, never returned in place of Timeout
    #[error("Process kill failed: {0}")]
    Killed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid task state: {0}")]
    InvalidState(#[from] DomainError),
}

impl From<std::io::Error> for ExecutionError {
    fn from(err: std::io::Error) -> Self {
        ExecutionError::IoError(err.to_string())
    }
}
