// Subprocess launcher implementation
// reason: tokio::process for async child management, nix for Unix signals
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pyexec_core::port::{ChildProcess, ExecutionError, ProcessLauncher, ProcessOutput};

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

type DrainHandle = JoinHandle<io::Result<Vec<u8>>>;

/// Spawns the interpreter as a child process with piped output
///
/// By default the child inherits the parent environment. With an allowlist,
/// only the listed variables are passed through.
#[derive(Debug, Clone, Default)]
pub struct SubprocessLauncher {
    env_allowlist: Option<Vec<String>>,
}

impl SubprocessLauncher {
    /// Create a launcher that inherits the parent environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a launcher that only passes allowlisted variables
    ///
    /// # Example
    /// ```ignore
    /// let launcher = SubprocessLauncher::with_env_allowlist(
    ///     vec!["PATH".to_string(), "HOME".to_string(), "SYSTEMROOT".to_string()],
    /// );
    /// ```
    pub fn with_env_allowlist(env_allowlist: Vec<String>) -> Self {
        Self {
            env_allowlist: Some(env_allowlist),
        }
    }

    /// Filter environment variables to the allowlist
    fn filter_env<I>(&self, env: I) -> Option<HashMap<String, String>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let allowlist = self.env_allowlist.as_ref()?;
        Some(
            env.into_iter()
                .filter(|(k, _)| allowlist.contains(k))
                .collect(),
        )
    }

    fn build_command(&self, interpreter: &str, script: &Path) -> Command {
        let mut command = Command::new(interpreter);
        command
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = self.filter_env(std::env::vars()) {
            command.env_clear().envs(env);
        }

        #[cfg(windows)]
        command.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);

        command
    }
}

#[async_trait]
impl ProcessLauncher for SubprocessLauncher {
    async fn launch(
        &self,
        interpreter: &str,
        script: &Path,
    ) -> Result<Box<dyn ChildProcess>, ExecutionError> {
        let mut command = self.build_command(interpreter, script);

        let started_at = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", interpreter, e)))?;
        let pid = child.id().ok_or_else(|| {
            ExecutionError::SpawnFailed("process exited before its pid was read".to_string())
        })?;

        // Drain both pipes from the start so a chatty child never blocks on a full buffer
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        debug!(
            pid = %pid,
            interpreter = %interpreter,
            script = %script.display(),
            "Interpreter spawned"
        );

        Ok(Box::new(SpawnedChild {
            child,
            pid,
            started_at,
            stdout,
            stderr,
        }))
    }
}

fn drain<R>(mut reader: R) -> DrainHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

async fn join_drain(handle: Option<DrainHandle>) -> Result<Vec<u8>, ExecutionError> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .await
            .map_err(|e| ExecutionError::IoError(format!("output reader failed: {}", e)))?
            .map_err(ExecutionError::from),
    }
}

/// A live interpreter process with its output being drained in the background
pub struct SpawnedChild {
    child: Child,
    pid: u32,
    started_at: Instant,
    stdout: Option<DrainHandle>,
    stderr: Option<DrainHandle>,
}

impl SpawnedChild {
    fn discard_output(&mut self) {
        for handle in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    /// SIGTERM, then SIGKILL if the process outlives the grace period
    #[cfg(unix)]
    async fn kill_graceful(&mut self) -> Result<(), ExecutionError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        use pyexec_core::application::constants::TERMINATE_GRACE_PERIOD;

        let raw_pid = i32::try_from(self.pid)
            .map_err(|_| ExecutionError::Killed(format!("pid {} out of range", self.pid)))?;

        info!(pid = %self.pid, "Sending SIGTERM");
        if let Err(e) = kill(Pid::from_raw(raw_pid), Signal::SIGTERM) {
            debug!(pid = %self.pid, error = %e, "SIGTERM not delivered");
        }

        match tokio::time::timeout(TERMINATE_GRACE_PERIOD, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid = %self.pid, status = %status, "Process exited after SIGTERM");
                Ok(())
            }
            Ok(Err(e)) => Err(ExecutionError::Killed(format!("wait failed: {}", e))),
            Err(_) => {
                warn!(pid = %self.pid, "Process did not exit after SIGTERM, sending SIGKILL");
                self.force_kill().await
            }
        }
    }

    async fn force_kill(&mut self) -> Result<(), ExecutionError> {
        self.child
            .start_kill()
            .map_err(|e| ExecutionError::Killed(format!("kill failed: {}", e)))?;
        self.child
            .wait()
            .await
            .map_err(|e| ExecutionError::Killed(format!("wait after kill failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ChildProcess for SpawnedChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn started_at(&self) -> Instant {
        self.started_at
    }

    fn try_exited(&mut self) -> Option<bool> {
        match self.child.try_wait() {
            Ok(status) => Some(status.is_some()),
            Err(e) => {
                debug!(pid = %self.pid, error = %e, "try_wait failed");
                None
            }
        }
    }

    async fn terminate(&mut self) -> Result<(), ExecutionError> {
        self.discard_output();

        #[cfg(unix)]
        let result = self.kill_graceful().await;

        #[cfg(not(unix))]
        let result = {
            info!(pid = %self.pid, "Terminating process");
            self.force_kill().await
        };

        result
    }

    /// Wait for exit, then read both pipes to end-of-file.
    ///
    /// Not bounded by the wall-clock budget: a background process that
    /// inherited stdout or stderr keeps the pipe open, and collection waits
    /// until it exits too. Only reachable with the static scan disabled.
    async fn collect(&mut self) -> Result<ProcessOutput, ExecutionError> {
        let status = self.child.wait().await?;
        let stdout = join_drain(self.stdout.take()).await?;
        let stderr = join_drain(self.stderr.take()).await?;

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: status.code(),
        })
    }
}
