// Code Stager Port
// Writes submitted code to the executor-owned staged file

use async_trait::async_trait;
use std::path::Path;

use super::ExecutionError;

#[async_trait]
pub trait CodeStager: Send + Sync {
    /// Replace the full contents of `path` with `code`, creating it if needed
    ///
    /// # Errors
    /// - ExecutionError::IoError on any write failure
    async fn stage(&self, path: &Path, code: &str) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Records staged writes in memory
    #[derive(Clone, Default)]
    pub struct MockCodeStager {
        writes: Arc<Mutex<Vec<(PathBuf, String)>>>,
        fail_with: Option<String>,
    }

    impl MockCodeStager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                writes: Arc::default(),
                fail_with: Some(message.into()),
            }
        }

        pub fn writes(&self) -> Vec<(PathBuf, String)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CodeStager for MockCodeStager {
        async fn stage(&self, path: &Path, code: &str) -> Result<(), ExecutionError> {
            if let Some(msg) = &self.fail_with {
                return Err(ExecutionError::IoError(msg.clone()));
            }
            self.writes
                .lock()
                .unwrap()
                .push((path.to_path_buf(), code.to_string()));
            Ok(())
        }
    }
}
