// Process table liveness probe
// reason: sysinfo for cross-platform process-table inspection
use std::sync::Mutex;
use sysinfo::{Pid, ProcessStatus, System};
use tracing::debug;

use pyexec_core::port::LivenessProbe;

/// Liveness check by pid using the OS process table
///
/// Used when the child handle cannot answer on its own. Zombie and dead
/// entries count as exited.
pub struct ProcessTableProbe {
    system: Mutex<System>,
}

impl ProcessTableProbe {
    /// Create a new probe
    ///
    /// # Example
    /// ```ignore
    /// let probe = ProcessTableProbe::new();
    /// ```
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for ProcessTableProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for ProcessTableProbe {
    fn is_alive(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        let mut sys = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // refresh_process returns false once the pid is gone from the table
        if !sys.refresh_process(pid) {
            debug!(pid = %pid, "Process not found in process table");
            return false;
        }

        let alive = sys
            .process(pid)
            .map(|process| !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead))
            .unwrap_or(false);

        debug!(pid = %pid, alive = %alive, "Process table checked");
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Duration;

    #[test]
    fn test_current_process_is_alive() {
        let probe = ProcessTableProbe::new();
        assert!(probe.is_alive(std::process::id()));
    }

    #[test]
    fn test_unknown_pid_is_not_alive() {
        let probe = ProcessTableProbe::new();
        // Above the largest pid_max Linux allows
        assert!(!probe.is_alive(999_999_999));
    }

    #[cfg(unix)]
    #[test]
    fn test_killed_process_is_not_alive() {
        let probe = ProcessTableProbe::new();
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        assert!(probe.is_alive(child.id()));

        child.kill().unwrap();
        child.wait().unwrap();

        assert!(!probe.is_alive(child.id()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_zombie_is_not_alive() {
        let probe = ProcessTableProbe::new();
        let mut child = Command::new("true").spawn().unwrap();

        // Exited but not reaped yet
        std::thread::sleep(Duration::from_millis(300));
        assert!(!probe.is_alive(child.id()));

        child.wait().unwrap();
    }
}
