// File stager
// reason: tokio::fs keeps the write on the runtime's blocking pool
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use pyexec_core::port::{CodeStager, ExecutionError};

/// Writes code to the executor's staged file, truncating previous contents
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStager;

#[async_trait]
impl CodeStager for FileStager {
    async fn stage(&self, path: &Path, code: &str) -> Result<(), ExecutionError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExecutionError::IoError(format!("{}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(path, code)
            .await
            .map_err(|e| ExecutionError::IoError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = code.len(), "Code staged");
        Ok(())
    }
}
