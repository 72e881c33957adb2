// Timeout Supervisor
// Drives liveness polling until the process exits or its deadline passes
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::{ExecutionConfig, Task};
use crate::port::{ChildProcess, ExecutionError, LivenessProbe};

/// How supervision ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupervisionOutcome {
    /// Exit observed; output is ready to collect
    Completed,
    /// Deadline passed; the process has been terminated and its output dropped
    TimedOut(Duration),
}

/// Owns the deadline for one executor
pub struct TimeoutSupervisor {
    timeout: Duration,
    poll_interval: Duration,
    probe: Arc<dyn LivenessProbe>,
}

impl TimeoutSupervisor {
    /// Create a supervisor
    ///
    /// # Arguments
    /// * `timeout` - Wall-clock budget measured from task start
    /// * `poll_interval` - Sleep between liveness checks
    /// * `probe` - Process-table fallback when the child handle cannot answer
    pub fn new(timeout: Duration, poll_interval: Duration, probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            timeout,
            poll_interval,
            probe,
        }
    }

    pub fn from_config(config: &ExecutionConfig, probe: Arc<dyn LivenessProbe>) -> Self {
        Self::new(config.timeout(), config.poll_interval(), probe)
    }

    /// Poll `child` until it exits or the task exceeds its budget.
    ///
    /// Within a tick the exit check runs before the deadline check, so a
    /// process seen as exited always completes. Overshoot past the nominal
    /// timeout is bounded by one poll interval.
    pub async fn supervise(
        &self,
        task: &mut Task,
        child: &mut dyn ChildProcess,
    ) -> Result<SupervisionOutcome, ExecutionError> {
        loop {
            sleep(self.poll_interval).await;

            if !self.is_running(child) {
                task.complete()?;
                return Ok(SupervisionOutcome::Completed);
            }

            let elapsed = task.elapsed();
            if elapsed >= self.timeout {
                task.time_out()?;
                warn!(
                    pid = %child.pid(),
                    elapsed_ms = %elapsed.as_millis(),
                    timeout_ms = %self.timeout.as_millis(),
                    "Execution deadline exceeded, terminating process"
                );
                // Termination failure must not mask the timeout
                if let Err(e) = child.terminate().await {
                    warn!(pid = %child.pid(), error = %e, "Failed to terminate timed-out process");
                }
                return Ok(SupervisionOutcome::TimedOut(elapsed));
            }
        }
    }

    fn is_running(&self, child: &mut dyn ChildProcess) -> bool {
        match child.try_exited() {
            Some(exited) => !exited,
            None => {
                debug!(pid = %child.pid(), "Handle check unavailable, using process table");
                self.probe.is_alive(child.pid())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskState;
    use crate::port::liveness_probe::mocks::MockLivenessProbe;
    use crate::port::process_launcher::mocks::{MockExit, MockProcessLauncher};
    use crate::port::{ProcessLauncher, ProcessOutput};
    use std::path::Path;

    const TIMEOUT: Duration = Duration::from_secs(1);
    const INTERVAL: Duration = Duration::from_millis(25);

    async fn launch(launcher: &MockProcessLauncher) -> (Task, Box<dyn ChildProcess>) {
        let child = launcher
            .launch("python3", Path::new("staged.py"))
            .await
            .unwrap();
        let mut task = Task::staged("code");
        task.start(child.pid(), child.started_at()).unwrap();
        (task, child)
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_when_exit_observed() {
        let probe = Arc::new(MockLivenessProbe::new());
        let supervisor = TimeoutSupervisor::new(TIMEOUT, INTERVAL, probe.clone());
        let launcher = MockProcessLauncher::new(MockExit::AfterChecks(3), ProcessOutput::default());
        let (mut task, mut child) = launch(&launcher).await;

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        assert_eq!(outcome, SupervisionOutcome::Completed);
        assert_eq!(task.state, TaskState::Completed);
        assert!(task.elapsed() >= INTERVAL * 3);
        assert!(task.elapsed() < INTERVAL * 4);
        assert_eq!(launcher.child_state(0).lock().unwrap().checks, 3);
        assert_eq!(probe.query_count(), 0, "native check should be preferred");
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_within_one_interval() {
        let supervisor =
            TimeoutSupervisor::new(TIMEOUT, INTERVAL, Arc::new(MockLivenessProbe::new()));
        let launcher = MockProcessLauncher::new(MockExit::Never, ProcessOutput::default());
        let (mut task, mut child) = launch(&launcher).await;

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        let SupervisionOutcome::TimedOut(elapsed) = outcome else {
            panic!("expected timeout, got {:?}", outcome);
        };
        assert!(elapsed >= TIMEOUT);
        assert!(elapsed < TIMEOUT + INTERVAL);
        assert_eq!(task.state, TaskState::TimedOut);
        assert!(launcher.child_state(0).lock().unwrap().terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_on_deadline_tick_counts_as_completed() {
        let supervisor =
            TimeoutSupervisor::new(TIMEOUT, INTERVAL, Arc::new(MockLivenessProbe::new()));
        // 40 checks * 25ms lands exactly on the 1s deadline
        let launcher =
            MockProcessLauncher::new(MockExit::AfterChecks(40), ProcessOutput::default());
        let (mut task, mut child) = launch(&launcher).await;

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        assert_eq!(outcome, SupervisionOutcome::Completed);
        assert!(task.elapsed() >= TIMEOUT);
        assert!(!launcher.child_state(0).lock().unwrap().terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_probe() {
        let probe = Arc::new(MockLivenessProbe::new());
        let supervisor = TimeoutSupervisor::new(TIMEOUT, INTERVAL, probe.clone());
        let launcher = MockProcessLauncher::new(MockExit::Never, ProcessOutput::default())
            .without_native_check();
        let (mut task, mut child) = launch(&launcher).await;
        probe.set_alive(child.pid(), true);

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        assert!(matches!(outcome, SupervisionOutcome::TimedOut(_)));
        assert!(probe.query_count() >= 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_reports_exit() {
        let probe = Arc::new(MockLivenessProbe::new());
        let supervisor = TimeoutSupervisor::new(TIMEOUT, INTERVAL, probe.clone());
        let launcher = MockProcessLauncher::new(MockExit::Never, ProcessOutput::default())
            .without_native_check();
        let (mut task, mut child) = launch(&launcher).await;

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        assert_eq!(outcome, SupervisionOutcome::Completed);
        assert_eq!(probe.query_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_failure_does_not_mask_timeout() {
        let supervisor =
            TimeoutSupervisor::new(TIMEOUT, INTERVAL, Arc::new(MockLivenessProbe::new()));
        let launcher = MockProcessLauncher::new(MockExit::Never, ProcessOutput::default())
            .failing_terminate();
        let (mut task, mut child) = launch(&launcher).await;

        let outcome = supervisor.supervise(&mut task, child.as_mut()).await.unwrap();

        assert!(matches!(outcome, SupervisionOutcome::TimedOut(_)));
    }
}
