// Application Layer - Execution use case

pub mod collector;
pub mod constants;
pub mod executor;
pub mod supervisor;

// Re-exports
pub use executor::Executor;
pub use supervisor::{SupervisionOutcome, TimeoutSupervisor};
