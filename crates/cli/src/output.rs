//! Result and error rendering
//!
//! stdout carries only the JSON result. Failures become one line on stderr.

use pyexec_core::domain::ExecutionResult;
use pyexec_core::port::ExecutionError;

/// JSON line for a successful run: `{"stdout":..,"stderr":..,"execTime":..}`
pub fn render_result(result: &ExecutionResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

/// Machine-parseable error line, `<Kind>: <detail>`
pub fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ExecutionError>() {
        Some(exec_err) => render_execution_error(exec_err),
        None => format!("Error: {:#}", err),
    }
}

fn render_execution_error(err: &ExecutionError) -> String {
    match err {
        ExecutionError::SyntaxParse(msg) => format!("SyntaxError: {}", msg),
        ExecutionError::UnsafeCode(name) => format!("UnsafeCodeError: {}", name),
        ExecutionError::SpawnFailed(msg) => format!("LaunchError: {}", msg),
        ExecutionError::Timeout(elapsed) => format!("ExecTimeoutError: {:.3}", elapsed),
        ExecutionError::IoError(msg) => format!("IOError: {}", msg),
        ExecutionError::Killed(msg) => format!("KillError: {}", msg),
        ExecutionError::InvalidState(e) => format!("InternalError: {}", e),
    }
}
