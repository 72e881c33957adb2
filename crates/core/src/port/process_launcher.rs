// Process Launcher Port
// Starts the interpreter against the staged file and hands back a live child

use async_trait::async_trait;
use std::path::Path;
use tokio::time::Instant;

use super::ExecutionError;

/// Raw output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

/// Handle to a launched interpreter process
#[async_trait]
pub trait ChildProcess: Send {
    /// Platform process identifier, recorded right after spawn
    fn pid(&self) -> u32;

    /// Instant recorded right before spawn
    fn started_at(&self) -> Instant;

    /// Native exit check through the owned handle
    ///
    /// Returns `None` when the handle cannot answer, in which case callers
    /// fall back to a [`LivenessProbe`](super::LivenessProbe).
    fn try_exited(&mut self) -> Option<bool>;

    /// Forcibly stop the process and reap it (best-effort)
    ///
    /// # Errors
    /// - ExecutionError::Killed if the termination call fails
    async fn terminate(&mut self) -> Result<(), ExecutionError>;

    /// Wait for exit and return everything the process wrote
    ///
    /// Must be called at most once, after exit has been observed.
    ///
    /// # Errors
    /// - ExecutionError::IoError if an output stream cannot be read
    async fn collect(&mut self) -> Result<ProcessOutput, ExecutionError>;
}

/// Process Launcher trait
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `interpreter script` with piped stdout/stderr
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    async fn launch(
        &self,
        interpreter: &str,
        script: &Path,
    ) -> Result<Box<dyn ChildProcess>, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted behavior of a mock child
    #[derive(Debug, Clone)]
    pub enum MockExit {
        /// Exit is observed on the Nth liveness check (1-based)
        AfterChecks(usize),
        /// Never exits on its own
        Never,
    }

    /// Observable state shared between a mock child and the test
    #[derive(Debug, Default)]
    pub struct MockChildState {
        pub checks: usize,
        pub terminated: bool,
        pub collected: bool,
    }

    /// Mock child process
    pub struct MockChildProcess {
        pid: u32,
        started_at: Instant,
        exit: MockExit,
        native_check: bool,
        output: ProcessOutput,
        fail_terminate: bool,
        state: Arc<Mutex<MockChildState>>,
    }

    #[async_trait]
    impl ChildProcess for MockChildProcess {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn started_at(&self) -> Instant {
            self.started_at
        }

        fn try_exited(&mut self) -> Option<bool> {
            if !self.native_check {
                return None;
            }
            let mut state = self.state.lock().unwrap();
            state.checks += 1;
            match self.exit {
                MockExit::AfterChecks(n) => Some(state.checks >= n),
                MockExit::Never => Some(state.terminated),
            }
        }

        async fn terminate(&mut self) -> Result<(), ExecutionError> {
            if self.fail_terminate {
                return Err(ExecutionError::Killed("operation not permitted".to_string()));
            }
            self.state.lock().unwrap().terminated = true;
            Ok(())
        }

        async fn collect(&mut self) -> Result<ProcessOutput, ExecutionError> {
            self.state.lock().unwrap().collected = true;
            Ok(self.output.clone())
        }
    }

    /// Mock launcher that hands out scripted children
    #[derive(Clone)]
    pub struct MockProcessLauncher {
        exit: MockExit,
        native_check: bool,
        output: ProcessOutput,
        fail_spawn: bool,
        fail_terminate: bool,
        next_pid: Arc<Mutex<u32>>,
        launches: Arc<Mutex<Vec<(String, std::path::PathBuf)>>>,
        children: Arc<Mutex<Vec<Arc<Mutex<MockChildState>>>>>,
    }

    impl MockProcessLauncher {
        pub fn new(exit: MockExit, output: ProcessOutput) -> Self {
            Self {
                exit,
                native_check: true,
                output,
                fail_spawn: false,
                fail_terminate: false,
                next_pid: Arc::new(Mutex::new(1000)),
                launches: Arc::default(),
                children: Arc::default(),
            }
        }

        /// Children report `None` from `try_exited`, forcing the probe fallback
        pub fn without_native_check(mut self) -> Self {
            self.native_check = false;
            self
        }

        pub fn failing_spawn(mut self) -> Self {
            self.fail_spawn = true;
            self
        }

        pub fn failing_terminate(mut self) -> Self {
            self.fail_terminate = true;
            self
        }

        pub fn launches(&self) -> Vec<(String, std::path::PathBuf)> {
            self.launches.lock().unwrap().clone()
        }

        /// State of the Nth launched child
        pub fn child_state(&self, index: usize) -> Arc<Mutex<MockChildState>> {
            Arc::clone(&self.children.lock().unwrap()[index])
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(
            &self,
            interpreter: &str,
            script: &Path,
        ) -> Result<Box<dyn ChildProcess>, ExecutionError> {
            if self.fail_spawn {
                return Err(ExecutionError::SpawnFailed(format!(
                    "{}: No such file or directory",
                    interpreter
                )));
            }
            self.launches
                .lock()
                .unwrap()
                .push((interpreter.to_string(), script.to_path_buf()));

            let pid = {
                let mut next = self.next_pid.lock().unwrap();
                *next += 1;
                *next
            };
            let state = Arc::new(Mutex::new(MockChildState::default()));
            self.children.lock().unwrap().push(Arc::clone(&state));

            Ok(Box::new(MockChildProcess {
                pid,
                started_at: Instant::now(),
                exit: self.exit.clone(),
                native_check: self.native_check,
                output: self.output.clone(),
                fail_terminate: self.fail_terminate,
                state,
            }))
        }
    }
}
