// Executor - scan, stage, launch, supervise, collect
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::collector;
use super::supervisor::{SupervisionOutcome, TimeoutSupervisor};
use crate::domain::{ExecutionConfig, ExecutionResult, SourceSubmission, Task};
use crate::port::{CodeScanner, CodeStager, ExecutionError, LivenessProbe, ProcessLauncher};

/// Runs submissions one at a time against a single staged file.
///
/// `execute` takes `&mut self`: an executor owns its staged file, so two runs on
/// the same instance can never overlap. Concurrent callers build separate
/// executors with separate staged paths.
pub struct Executor {
    config: ExecutionConfig,
    scanner: Arc<dyn CodeScanner>,
    stager: Arc<dyn CodeStager>,
    launcher: Arc<dyn ProcessLauncher>,
    supervisor: TimeoutSupervisor,
    runs: u64,
}

impl Executor {
    /// Create a new executor
    ///
    /// # Example
    /// ```ignore
    /// let executor = Executor::new(
    ///     ExecutionConfig::new("/tmp/pyexec-staged.py"),
    ///     Arc::new(PythonAstScanner::new(ScanPolicy::default())),
    ///     Arc::new(FileStager),
    ///     Arc::new(SubprocessLauncher::new()),
    ///     Arc::new(ProcessTableProbe::new()),
    /// );
    /// ```
    pub fn new(
        config: ExecutionConfig,
        scanner: Arc<dyn CodeScanner>,
        stager: Arc<dyn CodeStager>,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn LivenessProbe>,
    ) -> Self {
        let supervisor = TimeoutSupervisor::from_config(&config, probe);
        Self {
            config,
            scanner,
            stager,
            launcher,
            supervisor,
            runs: 0,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run one submission to completion or timeout
    ///
    /// # Errors
    /// - ExecutionError::SyntaxParse / UnsafeCode if the scan rejects (nothing staged or spawned)
    /// - ExecutionError::IoError if staging or reading output fails
    /// - ExecutionError::SpawnFailed if the interpreter cannot start
    /// - ExecutionError::Timeout with elapsed seconds; the process has been terminated
    pub async fn execute(
        &mut self,
        submission: &SourceSubmission,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.runs += 1;
        let run = self.runs;
        let code = submission.code();

        if submission.scan() {
            if let Err(e) = self.scanner.scan(code) {
                warn!(run, error = %e, "Submission rejected by static scan");
                return Err(e.into());
            }
        } else {
            debug!(run, "Static scan disabled for this submission");
        }

        let staged_file = self.config.staged_file();
        self.stager.stage(staged_file, code).await?;
        let mut task = Task::staged(code);

        let mut child = self
            .launcher
            .launch(self.config.interpreter(), staged_file)
            .await?;
        task.start(child.pid(), child.started_at())?;

        info!(
            run,
            pid = %child.pid(),
            interpreter = %self.config.interpreter(),
            staged_file = %staged_file.display(),
            timeout_ms = %self.config.timeout().as_millis(),
            "Subprocess launched"
        );

        match self.supervisor.supervise(&mut task, child.as_mut()).await? {
            SupervisionOutcome::Completed => collector::collect(&task, child.as_mut()).await,
            SupervisionOutcome::TimedOut(elapsed) => {
                Err(ExecutionError::Timeout(elapsed.as_secs_f64()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::code_scanner::mocks::MockCodeScanner;
    use crate::port::code_stager::mocks::MockCodeStager;
    use crate::port::liveness_probe::mocks::MockLivenessProbe;
    use crate::port::process_launcher::mocks::{MockExit, MockProcessLauncher};
    use crate::port::{ProcessOutput, ScanError};
    use std::path::PathBuf;

    fn config() -> ExecutionConfig {
        ExecutionConfig::new("/tmp/pyexec-test-staged.py")
            .with_timeout_secs(1.0)
            .unwrap()
            .with_checks_per_second(40)
            .unwrap()
            .with_interpreter("python3")
            .unwrap()
    }

    fn hello_output() -> ProcessOutput {
        ProcessOutput {
            stdout: b"hi\n".to_vec(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    fn executor(
        scanner: MockCodeScanner,
        stager: &MockCodeStager,
        launcher: &MockProcessLauncher,
    ) -> Executor {
        Executor::new(
            config(),
            Arc::new(scanner),
            Arc::new(stager.clone()),
            Arc::new(launcher.clone()),
            Arc::new(MockLivenessProbe::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_success() {
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(2), hello_output());
        let mut executor = executor(MockCodeScanner::accepting(), &stager, &launcher);

        let result = executor
            .execute(&SourceSubmission::scanned("print('hi')\n"))
            .await
            .unwrap();

        assert_eq!(result.stdout, "hi");
        assert_eq!(result.stderr, "");
        assert!(result.exec_time > 0.0);
        assert!(result.exec_time < 1.025);

        assert_eq!(
            stager.writes(),
            vec![(
                PathBuf::from("/tmp/pyexec-test-staged.py"),
                "print('hi')".to_string()
            )]
        );
        assert_eq!(
            launcher.launches(),
            vec![(
                "python3".to_string(),
                PathBuf::from("/tmp/pyexec-test-staged.py")
            )]
        );
        assert!(launcher.child_state(0).lock().unwrap().collected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_rejection_touches_nothing() {
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output());
        let mut executor = executor(
            MockCodeScanner::rejecting(ScanError::Unsafe("os".to_string())),
            &stager,
            &launcher,
        );

        let result = executor.execute(&SourceSubmission::scanned("import os")).await;

        assert_eq!(result, Err(ExecutionError::UnsafeCode("os".to_string())));
        assert!(stager.writes().is_empty());
        assert!(launcher.launches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_syntax_error_is_distinct() {
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output());
        let mut executor = executor(
            MockCodeScanner::rejecting(ScanError::Syntax("unexpected EOF".to_string())),
            &stager,
            &launcher,
        );

        let result = executor.execute(&SourceSubmission::scanned("def (")).await;

        assert!(matches!(result, Err(ExecutionError::SyntaxParse(_))));
        assert!(launcher.launches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_disabled_skips_scanner() {
        let scanner = Arc::new(MockCodeScanner::rejecting(ScanError::Unsafe(
            "exec".to_string(),
        )));
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output());
        let mut executor = Executor::new(
            config(),
            scanner.clone(),
            Arc::new(stager.clone()),
            Arc::new(launcher.clone()),
            Arc::new(MockLivenessProbe::new()),
        );

        let result = executor
            .execute(&SourceSubmission::unscanned("exec('print(1)')"))
            .await;

        assert!(result.is_ok());
        assert_eq!(scanner.call_count(), 0);
        assert_eq!(launcher.launches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_discards_output() {
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::Never, hello_output());
        let mut executor = executor(MockCodeScanner::accepting(), &stager, &launcher);

        let result = executor
            .execute(&SourceSubmission::scanned("while True: pass"))
            .await;

        match result {
            Err(ExecutionError::Timeout(elapsed)) => {
                assert!(elapsed >= 1.0);
                assert!(elapsed < 1.025);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        let state = launcher.child_state(0);
        let state = state.lock().unwrap();
        assert!(state.terminated);
        assert!(!state.collected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_failure_prevents_launch() {
        let stager = MockCodeStager::failing("permission denied");
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output());
        let mut executor = executor(MockCodeScanner::accepting(), &stager, &launcher);

        let result = executor.execute(&SourceSubmission::scanned("pass")).await;

        assert_eq!(
            result,
            Err(ExecutionError::IoError("permission denied".to_string()))
        );
        assert!(launcher.launches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_failure() {
        let stager = MockCodeStager::new();
        let launcher =
            MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output()).failing_spawn();
        let mut executor = executor(MockCodeScanner::accepting(), &stager, &launcher);

        let result = executor.execute(&SourceSubmission::scanned("pass")).await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
        assert_eq!(stager.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_runs_are_independent() {
        let stager = MockCodeStager::new();
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(1), hello_output());
        let mut executor = executor(MockCodeScanner::accepting(), &stager, &launcher);
        let submission = SourceSubmission::scanned("print('hi')");

        let first = executor.execute(&submission).await.unwrap();
        let second = executor.execute(&submission).await.unwrap();

        assert_eq!(first.stdout, "hi");
        assert_eq!(second.stdout, "hi");
        assert_eq!(launcher.launches().len(), 2);
        assert_eq!(stager.writes().len(), 2);
        assert!(launcher.child_state(0).lock().unwrap().collected);
        assert!(launcher.child_state(1).lock().unwrap().collected);
    }
}
