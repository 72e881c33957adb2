// Domain Layer - Pure execution model

pub mod config;
pub mod error;
pub mod policy;
pub mod result;
pub mod submission;
pub mod task;

// Re-exports
pub use config::ExecutionConfig;
pub use error::DomainError;
pub use policy::ScanPolicy;
pub use result::ExecutionResult;
pub use submission::SourceSubmission;
pub use task::{Task, TaskState};
