use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_CSV: &str = "servers_to_import.csv";
pub const DEFAULT_USER_FOLDER: &str = "PAM_Users";
pub const DEFAULT_RESOURCE_FOLDER: &str = "PAM_Resources";
pub const DEFAULT_SCHEDULE: &str = r#"{"type":"DAILY","time":"02:00","tz":"UTC"}"#;
pub const DEFAULT_OS: &str = "Windows";
/// WinRM over HTTPS; probed instead of the protocol port.
pub const DEFAULT_PROBE_PORT: u16 = 5986;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;
const MAX_DEFAULT_THREADS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    #[default]
    Rdp,
    Ssh,
    SqlServer,
    Mysql,
    Postgresql,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Rdp => 3389,
            Protocol::Ssh => 22,
            Protocol::SqlServer => 1433,
            Protocol::Mysql => 3306,
            Protocol::Postgresql => 5432,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Rdp => "rdp",
            Protocol::Ssh => "ssh",
            Protocol::SqlServer => "sql-server",
            Protocol::Mysql => "mysql",
            Protocol::Postgresql => "postgresql",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved options for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub gateway_uid: String,
    pub csv_path: PathBuf,
    pub user_folder: String,
    pub resource_folder: String,
    pub parent_folder: Option<String>,
    pub rotation_admin_uid: Option<String>,
    pub schedule_json: String,
    pub protocol: Protocol,
    pub os: String,
    pub ssl_verification: bool,
    pub dry_run: bool,
    pub connectivity_check: bool,
    pub threads: usize,
    pub probe_port: u16,
    pub probe_timeout: Duration,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Baseline configuration with every option at its built-in default.
    pub fn with_gateway(gateway_uid: impl Into<String>) -> Self {
        Self {
            gateway_uid: gateway_uid.into(),
            csv_path: PathBuf::from(DEFAULT_CSV),
            user_folder: DEFAULT_USER_FOLDER.to_string(),
            resource_folder: DEFAULT_RESOURCE_FOLDER.to_string(),
            parent_folder: None,
            rotation_admin_uid: None,
            schedule_json: DEFAULT_SCHEDULE.to_string(),
            protocol: Protocol::default(),
            os: DEFAULT_OS.to_string(),
            ssl_verification: false,
            dry_run: false,
            connectivity_check: false,
            threads: default_threads(),
            probe_port: DEFAULT_PROBE_PORT,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn port(&self) -> u16 {
        self.protocol.default_port()
    }

    /// Schedule with single quotes swapped for double quotes.
    ///
    /// This is a plain character substitution: a single quote that belongs
    /// inside a JSON string value is rewritten as well.
    pub fn normalized_schedule(&self) -> String {
        normalize_schedule(&self.schedule_json)
    }
}

pub fn normalize_schedule(raw: &str) -> String {
    raw.replace('\'', "\"")
}

/// Accepts schedule text only if it is JSON once quotes are normalized.
pub fn parse_schedule(raw: &str) -> std::result::Result<String, Error> {
    serde_json::from_str::<serde_json::Value>(&normalize_schedule(raw))
        .map(|_| raw.to_string())
        .map_err(|e| Error::InvalidSchedule(e.to_string()))
}

pub fn default_threads() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus * 5).min(MAX_DEFAULT_THREADS)
}

/// Optional defaults read from a TOML file. Command-line flags win.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileDefaults {
    pub csv: Option<PathBuf>,
    pub user_folder: Option<String>,
    pub resource_folder: Option<String>,
    pub parent_folder: Option<String>,
    pub rotation_admin_uid: Option<String>,
    pub schedule_json: Option<String>,
    pub protocol: Option<Protocol>,
    pub os: Option<String>,
    pub enable_ssl_verification: Option<bool>,
    pub connectivity_check: Option<bool>,
    pub threads: Option<usize>,
    pub probe_port: Option<u16>,
    pub probe_timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl FileDefaults {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let defaults: FileDefaults = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(schedule) = &defaults.schedule_json {
            parse_schedule(schedule)
                .with_context(|| format!("Bad schedule_json in {}", path.display()))?;
        }

        Ok(defaults)
    }
}
