//! Shared wiring for the end-to-end tests

use std::path::Path;
use std::sync::Arc;

use pyexec_core::application::Executor;
use pyexec_core::domain::config::default_interpreter;
use pyexec_core::domain::{ExecutionConfig, ScanPolicy};
use pyexec_infra_python::PythonAstScanner;
use pyexec_infra_system::{FileStager, ProcessTableProbe, SubprocessLauncher};

/// Executor wired with the real adapters
pub fn real_executor(config: ExecutionConfig) -> Executor {
    Executor::new(
        config,
        Arc::new(PythonAstScanner::new(ScanPolicy::default())),
        Arc::new(FileStager),
        Arc::new(SubprocessLauncher::new()),
        Arc::new(ProcessTableProbe::new()),
    )
}

/// Config with a staged file inside `dir`
pub fn config_in(dir: &Path, timeout_secs: f64, interpreter: &str) -> ExecutionConfig {
    ExecutionConfig::new(dir.join("staged.py"))
        .with_timeout_secs(timeout_secs)
        .and_then(|c| c.with_checks_per_second(40))
        .and_then(|c| c.with_interpreter(interpreter))
        .expect("valid test config")
}

/// True if the platform's default Python interpreter can be started
pub fn python_available() -> bool {
    std::process::Command::new(default_interpreter())
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
