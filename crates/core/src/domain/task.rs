// Task Domain Model
//
// One Task per execute call. Never reused.

use std::time::Duration;
use tokio::time::Instant;

use crate::domain::error::{DomainError, Result};

/// Task lifecycle: Staged -> Running -> {Completed, TimedOut}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Staged,
    Running,
    Completed,
    TimedOut,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Staged => write!(f, "STAGED"),
            TaskState::Running => write!(f, "RUNNING"),
            TaskState::Completed => write!(f, "COMPLETED"),
            TaskState::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

/// One in-flight execution
#[derive(Debug, Clone)]
pub struct Task {
    pub code: String,
    pub state: TaskState,
    pub pid: Option<u32>,
    pub started_at: Option<Instant>,
}

impl Task {
    /// Create a task for code that has just been written to the staged file
    pub fn staged(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: TaskState::Staged,
            pid: None,
            started_at: None,
        }
    }

    /// Transition to Running once the launcher returns a live process
    pub fn start(&mut self, pid: u32, started_at: Instant) -> Result<()> {
        self.transition(TaskState::Staged, TaskState::Running)?;
        self.pid = Some(pid);
        self.started_at = Some(started_at);
        Ok(())
    }

    /// Transition to Completed when the process is first observed to have exited
    pub fn complete(&mut self) -> Result<()> {
        self.transition(TaskState::Running, TaskState::Completed)
    }

    /// Transition to TimedOut when the deadline passes with the process alive
    pub fn time_out(&mut self) -> Result<()> {
        self.transition(TaskState::Running, TaskState::TimedOut)
    }

    /// Wall-clock time since start, zero if never started
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    fn transition(&mut self, expected: TaskState, next: TaskState) -> Result<()> {
        if self.state != expected {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}
