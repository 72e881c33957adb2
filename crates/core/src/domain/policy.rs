// Scan Policy Domain Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Names that enable dynamic evaluation, namespace reflection or file/stdin access.
pub const DEFAULT_DENIED_NAMES: &[&str] = &[
    "exec",
    "eval",
    "compile",
    "globals",
    "locals",
    "vars",
    "builtins",
    "dir",
    "open",
    "input",
    "breakpoint",
    "getattr",
    "delattr",
    "__dict__",
    "__base__",
];

/// Top-level packages a submission may import.
pub const DEFAULT_ALLOWED_MODULES: &[&str] = &[
    "datetime", "math", "random", "hashlib", "time", "getpass", "socket", "urllib",
];

/// Denylist / allowlist consulted by the static scanner.
///
/// Read-only once built. The same set applies to bare names and attribute
/// members, so `os.exec` is caught even when `exec` never appears alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    pub denied_names: BTreeSet<String>,
    pub allowed_modules: BTreeSet<String>,
}

impl ScanPolicy {
    pub fn new<D, A>(denied_names: D, allowed_modules: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            denied_names: denied_names.into_iter().map(Into::into).collect(),
            allowed_modules: allowed_modules.into_iter().map(Into::into).collect(),
        }
    }

    /// True if `name` may not be referenced as a bare name or attribute
    pub fn is_denied(&self, name: &str) -> bool {
        self.denied_names.contains(name)
    }

    /// True if importing `module` is permitted.
    ///
    /// Only the top-level package is compared: `urllib.parse` is allowed
    /// whenever `urllib` is. This is looser than matching the full dotted
    /// name, which would reject every submodule import.
    pub fn allows_module(&self, module: &str) -> bool {
        let top_level = module.split('.').next().unwrap_or(module);
        !top_level.is_empty() && self.allowed_modules.contains(top_level)
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENIED_NAMES.iter().copied(),
            DEFAULT_ALLOWED_MODULES.iter().copied(),
        )
    }
}
