// Code Scanner Port
// Static gate that inspects source text before it ever runs

use thiserror::Error;

use super::ExecutionError;

/// Scan rejection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Text is not valid source for the target language
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Offending identifier, attribute member or module name
    #[error("Unsafe code: {0}")]
    Unsafe(String),
}

impl From<ScanError> for ExecutionError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Syntax(msg) => ExecutionError::SyntaxParse(msg),
            ScanError::Unsafe(name) => ExecutionError::UnsafeCode(name),
        }
    }
}

/// Code Scanner trait
///
/// Implementations must never execute the code. A scanner is a best-effort
/// denylist/allowlist gate: aliasing (`import m as x`) and dynamically built
/// names are out of its reach.
pub trait CodeScanner: Send + Sync {
    /// Accept the source or report exactly one violation
    ///
    /// # Errors
    /// - ScanError::Syntax if the source does not parse
    /// - ScanError::Unsafe with the first offending name in traversal order
    fn scan(&self, source: &str) -> Result<(), ScanError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock scanner with a fixed verdict
    pub struct MockCodeScanner {
        verdict: Result<(), ScanError>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockCodeScanner {
        pub fn accepting() -> Self {
            Self {
                verdict: Ok(()),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn rejecting(err: ScanError) -> Self {
            Self {
                verdict: Err(err),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl CodeScanner for MockCodeScanner {
        fn scan(&self, _source: &str) -> Result<(), ScanError> {
            *self.call_count.lock().unwrap() += 1;
            self.verdict.clone()
        }
    }
}
