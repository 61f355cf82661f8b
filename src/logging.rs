use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn log_file_name() -> String {
    format!("bulk_onboard_{}.log", Utc::now().format("%Y%m%dT%H%M%SZ"))
}

/// Install console and file log sinks. Returns the path of the run log.
pub fn init_logging(log_dir: &Path) -> Result<PathBuf> {
    let log_path = log_dir.join(log_file_name());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::from_default_env().add_directive("pam_onboard=info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(log_path)
}
