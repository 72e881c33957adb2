//! Settings: defaults < TOML file < `PYEXEC_*` environment < command-line flags

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pyexec_core::application::constants::{DEFAULT_CHECKS_PER_SECOND, DEFAULT_TIMEOUT};
use pyexec_core::domain::ExecutionConfig;
use pyexec_core::domain::ScanPolicy;

const ENV_PREFIX: &str = "PYEXEC";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeout_secs: f64,
    pub checks_per_second: u32,
    pub python_cmd: Option<String>,
    pub staged_file: Option<PathBuf>,
    /// Pass only these variables to the interpreter; inherit everything when unset
    pub env_allowlist: Option<Vec<String>>,
    pub policy: ScanPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            checks_per_second: DEFAULT_CHECKS_PER_SECOND,
            python_cmd: None,
            staged_file: None,
            env_allowlist: None,
            policy: ScanPolicy::default(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub timeout_secs: Option<f64>,
    pub checks_per_second: Option<u32>,
    pub python_cmd: Option<String>,
    pub staged_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from an optional file plus the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(checks_per_second) = overrides.checks_per_second {
            self.checks_per_second = checks_per_second;
        }
        if overrides.python_cmd.is_some() {
            self.python_cmd = overrides.python_cmd;
        }
        if overrides.staged_file.is_some() {
            self.staged_file = overrides.staged_file;
        }
        self
    }

    /// Staged file for this process; unique per pid so parallel CLI runs never share one
    pub fn staged_file_path(&self) -> PathBuf {
        self.staged_file.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("pyexec-{}.py", std::process::id()))
        })
    }

    pub fn execution_config(&self) -> Result<ExecutionConfig> {
        let mut config = ExecutionConfig::new(self.staged_file_path())
            .with_timeout_secs(self.timeout_secs)?
            .with_checks_per_second(self.checks_per_second)?;
        if let Some(python_cmd) = &self.python_cmd {
            config = config.with_interpreter(python_cmd.as_str())?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        let config = settings.execution_config().unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_millis(25));
        assert!(config
            .staged_file()
            .to_string_lossy()
            .contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyexec.toml");
        std::fs::write(
            &path,
            r#"
timeout_secs = 2.5
checks_per_second = 10
python_cmd = "pypy3"

[policy]
allowed_modules = ["math", "json"]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.timeout_secs, 2.5);
        assert_eq!(settings.checks_per_second, 10);
        assert_eq!(settings.python_cmd.as_deref(), Some("pypy3"));
        assert!(settings.policy.allows_module("json"));
        assert!(!settings.policy.allows_module("random"));
        assert!(settings.policy.is_denied("exec"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let settings = Settings::default().with_overrides(Overrides {
            timeout_secs: Some(1.0),
            checks_per_second: None,
            python_cmd: Some("python3.12".to_string()),
            staged_file: Some(PathBuf::from("/tmp/custom.py")),
        });

        let config = settings.execution_config().unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.poll_interval(), Duration::from_millis(25));
        assert_eq!(config.interpreter(), "python3.12");
        assert_eq!(config.staged_file(), Path::new("/tmp/custom.py"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let settings = Settings::default().with_overrides(Overrides {
            timeout_secs: Some(0.0),
            ..Overrides::default()
        });
        assert!(settings.execution_config().is_err());
    }
}
