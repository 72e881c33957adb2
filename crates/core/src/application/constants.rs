// Execution constants (No magic values)
use std::time::Duration;

/// Default wall-clock budget per execution (5s)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default liveness checks per second (poll interval = 25ms)
pub const DEFAULT_CHECKS_PER_SECOND: u32 = 40;

/// How long a process gets to exit after SIGTERM before SIGKILL (Unix only)
pub const TERMINATE_GRACE_PERIOD: Duration = Duration::from_millis(200);
