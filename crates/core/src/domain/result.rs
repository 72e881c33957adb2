// Execution Result Domain Model

use serde::{Deserialize, Serialize};

/// Captured output of a run that finished within its budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock seconds from spawn to observed exit
    #[serde(rename = "execTime")]
    pub exec_time: f64,
}
