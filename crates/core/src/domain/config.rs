// Execution Configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::constants::{DEFAULT_CHECKS_PER_SECOND, DEFAULT_TIMEOUT};
use crate::domain::error::{DomainError, Result};

/// Platform-conventional interpreter name
pub fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Per-executor configuration, immutable once built.
///
/// The staged file is owned by exactly one executor; two executors running
/// concurrently must be given different paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    staged_file: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
    interpreter: String,
}

impl ExecutionConfig {
    /// Create a config with default timeout, poll rate and interpreter
    pub fn new(staged_file: impl Into<PathBuf>) -> Self {
        Self {
            staged_file: staged_file.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: Duration::from_secs(1) / DEFAULT_CHECKS_PER_SECOND,
            interpreter: default_interpreter().to_string(),
        }
    }

    /// Set the wall-clock budget in seconds
    pub fn with_timeout_secs(mut self, secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(DomainError::ValidationError(format!(
                "timeout must be a positive number of seconds, got {}",
                secs
            )));
        }
        self.timeout = Duration::from_secs_f64(secs);
        Ok(self)
    }

    /// Set the poll rate; the poll interval becomes `1 / checks_per_second`
    pub fn with_checks_per_second(mut self, checks_per_second: u32) -> Result<Self> {
        if checks_per_second == 0 {
            return Err(DomainError::ValidationError(
                "checks per second must be greater than zero".to_string(),
            ));
        }
        self.poll_interval = Duration::from_secs(1) / checks_per_second;
        Ok(self)
    }

    /// Override the interpreter command
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Result<Self> {
        let interpreter = interpreter.into();
        if interpreter.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "interpreter command must not be empty".to_string(),
            ));
        }
        self.interpreter = interpreter;
        Ok(self)
    }

    pub fn staged_file(&self) -> &Path {
        &self.staged_file
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}
