// Port Layer - Interfaces for external dependencies

pub mod code_scanner;
pub mod code_stager;
pub mod execution_error;
pub mod liveness_probe;
pub mod process_launcher;

// Re-exports
pub use code_scanner::{CodeScanner, ScanError};
pub use code_stager::CodeStager;
pub use execution_error::ExecutionError;
pub use liveness_probe::LivenessProbe;
pub use process_launcher::{ChildProcess, ProcessLauncher, ProcessOutput};
