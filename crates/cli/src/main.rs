//! PyExec CLI - run one Python file through the restricted execution engine

mod output;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pyexec_core::application::Executor;
use pyexec_core::domain::{ExecutionResult, SourceSubmission};
use pyexec_infra_python::PythonAstScanner;
use pyexec_infra_system::{FileStager, ProcessTableProbe, SubprocessLauncher};
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "pyexec")]
#[command(about = "Run a Python file under a static scan and a wall-clock timeout", long_about = None)]
#[command(version)]
struct Cli {
    /// Python source file to execute
    file: PathBuf,

    /// Skip the static safety scan
    #[arg(long)]
    no_scan: bool,

    /// Wall-clock timeout in seconds (default: 5)
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Liveness checks per second (default: 40)
    #[arg(long)]
    checks_per_second: Option<u32>,

    /// Interpreter command (default: python3, or python on Windows)
    #[arg(long)]
    python_cmd: Option<String>,

    /// Where the submission is written before it runs
    #[arg(long)]
    staged_file: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long, env = "PYEXEC_CONFIG")]
    config: Option<PathBuf>,
}

fn init_logging() {
    // Logs go to stderr; stdout is reserved for the JSON result
    let log_format = std::env::var("PYEXEC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_executor(settings: &Settings) -> Result<Executor> {
    let config = settings.execution_config()?;

    let launcher = match &settings.env_allowlist {
        Some(allowlist) => SubprocessLauncher::with_env_allowlist(allowlist.clone()),
        None => SubprocessLauncher::new(),
    };

    Ok(Executor::new(
        config,
        Arc::new(PythonAstScanner::new(settings.policy.clone())),
        Arc::new(FileStager),
        Arc::new(launcher),
        Arc::new(ProcessTableProbe::new()),
    ))
}

async fn run(cli: Cli) -> Result<ExecutionResult> {
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(Overrides {
        timeout_secs: cli.timeout,
        checks_per_second: cli.checks_per_second,
        python_cmd: cli.python_cmd,
        staged_file: cli.staged_file,
    });

    let code = tokio::fs::read_to_string(&cli.file)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let mut executor = build_executor(&settings)?;
    info!(
        version = pyexec_core::VERSION,
        file = %cli.file.display(),
        scan = !cli.no_scan,
        timeout_ms = %executor.config().timeout().as_millis(),
        "Executing submission"
    );

    let submission = SourceSubmission::new(code, !cli.no_scan);
    Ok(executor.execute(&submission).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(result) => match output::render_result(&result) {
            Ok(line) => {
                println!("{}", line);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", output::render_error(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "pyexec",
            "job.py",
            "--no-scan",
            "--timeout",
            "1.5",
            "--checks-per-second",
            "20",
            "--python-cmd",
            "pypy3",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("job.py"));
        assert!(cli.no_scan);
        assert_eq!(cli.timeout, Some(1.5));
        assert_eq!(cli.checks_per_second, Some(20));
        assert_eq!(cli.python_cmd.as_deref(), Some("pypy3"));
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["pyexec"]).is_err());
    }

    #[tokio::test]
    async fn test_rejected_submission_surfaces_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("job.py");
        std::fs::write(&source, "import os\nos.system('true')\n").unwrap();

        let cli = Cli::try_parse_from([
            "pyexec".into(),
            source.clone().into_os_string(),
            "--staged-file".into(),
            dir.path().join("staged.py").into_os_string(),
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();

        assert_eq!(output::render_error(&err), "UnsafeCodeError: os");
        assert!(!dir.path().join("staged.py").exists());
    }
}
