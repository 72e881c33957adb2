// Liveness Probe Port
// Process-table fallback for "has this process exited?"

/// Answers liveness by pid alone, without owning a wait handle.
///
/// A zombie (exited but not yet reaped) process must be reported as not alive.
pub trait LivenessProbe: Send + Sync {
    /// Check if a process is still running
    ///
    /// # Arguments
    /// * `pid` - Process ID to check
    fn is_alive(&self, pid: u32) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Mock probe backed by a set of live pids
    #[derive(Clone, Default)]
    pub struct MockLivenessProbe {
        alive: Arc<Mutex<HashSet<u32>>>,
        queries: Arc<Mutex<usize>>,
    }

    impl MockLivenessProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_alive(&self, pid: u32, alive: bool) {
            let mut set = self.alive.lock().unwrap();
            if alive {
                set.insert(pid);
            } else {
                set.remove(&pid);
            }
        }

        pub fn query_count(&self) -> usize {
            *self.queries.lock().unwrap()
        }
    }

    impl LivenessProbe for MockLivenessProbe {
        fn is_alive(&self, pid: u32) -> bool {
            *self.queries.lock().unwrap() += 1;
            self.alive.lock().unwrap().contains(&pid)
        }
    }
}
