// Result Collector
// Turns a finished process into an ExecutionResult
use tracing::info;

use crate::domain::{ExecutionResult, Task};
use crate::port::{ChildProcess, ExecutionError};

/// Drain the child's output and stamp the elapsed time
///
/// A non-zero exit status is not a failure here: the interpreter's traceback
/// is returned in `stderr` like any other output.
pub async fn collect(
    task: &Task,
    child: &mut dyn ChildProcess,
) -> Result<ExecutionResult, ExecutionError> {
    let output = child.collect().await?;
    let exec_time = task.elapsed().as_secs_f64();

    info!(
        pid = ?task.pid,
        exit_code = ?output.exit_code,
        exec_time = %exec_time,
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "Subprocess execution completed"
    );

    Ok(ExecutionResult {
        stdout: decode(&output.stdout),
        stderr: decode(&output.stderr),
        exec_time,
    })
}

/// Lossy UTF-8 decode with surrounding whitespace trimmed
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
