//! Command-line surface and resolution into a [`RunConfig`].

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, FileDefaults, Protocol, RunConfig};

fn schedule_arg(raw: &str) -> Result<String, String> {
    config::parse_schedule(raw).map_err(|e| e.to_string())
}

/// Generate PAM vault import JSON and CLI commands from a server CSV
#[derive(Debug, Parser)]
#[command(name = "pam-onboard", version)]
pub struct Cli {
    /// UID of the gateway that routes connections to the servers
    #[arg(long)]
    pub gateway_uid: String,

    /// CSV with hostname, initial_admin_user, initial_admin_password [default: servers_to_import.csv]
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Shared folder for pamUser records [default: PAM_Users]
    #[arg(long)]
    pub user_folder: Option<String>,

    /// Shared folder for pamMachine records [default: PAM_Resources]
    #[arg(long)]
    pub resource_folder: Option<String>,

    /// Existing parent folder path to nest the user and resource folders under
    #[arg(long)]
    pub parent_folder: Option<String>,

    /// UID of the pamUser that performs password resets
    #[arg(long)]
    pub rotation_admin_uid: Option<String>,

    /// Rotation schedule as JSON; single quotes are accepted
    /// [default: {"type":"DAILY","time":"02:00","tz":"UTC"}]
    #[arg(long = "schedulejson", value_parser = schedule_arg)]
    pub schedule_json: Option<String>,

    /// Connection protocol [default: rdp]
    #[arg(long, value_enum)]
    pub protocol: Option<Protocol>,

    /// Operating system recorded on machines [default: Windows]
    #[arg(long)]
    pub os: Option<String>,

    /// Set the SSL verification flag on machines
    #[arg(long)]
    pub enable_ssl_verification: bool,

    /// Log what would be written without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Drop servers that do not accept a TCP connection on the probe port
    #[arg(long)]
    pub connectivity_check: bool,

    /// Concurrent reachability probes [default: min(32, cpus * 5)]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Port used by the reachability check [default: 5986]
    #[arg(long)]
    pub probe_port: Option<u16>,

    /// Seconds to wait for each probe connection [default: 3]
    #[arg(long)]
    pub probe_timeout: Option<u64>,

    /// Directory receiving the generated files [default: .]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Directory receiving the run log
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// TOML file with defaults for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the optional config file over built-in defaults.
    pub fn resolve(self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => FileDefaults::load(path)?,
            None => FileDefaults::default(),
        };
        Ok(self.resolve_with(file))
    }

    pub fn resolve_with(self, file: FileDefaults) -> RunConfig {
        let mut cfg = RunConfig::with_gateway(self.gateway_uid);

        if let Some(csv) = self.csv.or(file.csv) {
            cfg.csv_path = csv;
        }
        if let Some(folder) = self.user_folder.or(file.user_folder) {
            cfg.user_folder = folder;
        }
        if let Some(folder) = self.resource_folder.or(file.resource_folder) {
            cfg.resource_folder = folder;
        }
        cfg.parent_folder = non_empty(self.parent_folder.or(file.parent_folder));
        cfg.rotation_admin_uid = non_empty(self.rotation_admin_uid.or(file.rotation_admin_uid));
        if let Some(schedule) = self.schedule_json.or(file.schedule_json) {
            cfg.schedule_json = schedule;
        }
        if let Some(protocol) = self.protocol.or(file.protocol) {
            cfg.protocol = protocol;
        }
        if let Some(os) = self.os.or(file.os) {
            cfg.os = os;
        }
        cfg.ssl_verification =
            self.enable_ssl_verification || file.enable_ssl_verification.unwrap_or(false);
        cfg.connectivity_check =
            self.connectivity_check || file.connectivity_check.unwrap_or(false);
        cfg.dry_run = self.dry_run;
        if let Some(threads) = self.threads.or(file.threads) {
            cfg.threads = threads.max(1);
        }
        if let Some(port) = self.probe_port.or(file.probe_port) {
            cfg.probe_port = port;
        }
        if let Some(secs) = self.probe_timeout.or(file.probe_timeout_secs) {
            cfg.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = self.output_dir.or(file.output_dir) {
            cfg.output_dir = dir;
        }
        cfg
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["pam-onboard"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_gateway_is_required() {
        assert!(Cli::try_parse_from(["pam-onboard"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["--gateway-uid", "GW"]).resolve_with(FileDefaults::default());
        assert_eq!(cfg.gateway_uid, "GW");
        assert_eq!(cfg.csv_path, PathBuf::from("servers_to_import.csv"));
        assert_eq!(cfg.user_folder, "PAM_Users");
        assert_eq!(cfg.resource_folder, "PAM_Resources");
        assert_eq!(cfg.schedule_json, config::DEFAULT_SCHEDULE);
        assert_eq!(cfg.protocol, Protocol::Rdp);
        assert_eq!(cfg.os, "Windows");
        assert_eq!(cfg.probe_port, 5986);
        assert_eq!(cfg.probe_timeout, Duration::from_secs(3));
        assert!(cfg.parent_folder.is_none());
        assert!(!cfg.dry_run && !cfg.connectivity_check && !cfg.ssl_verification);
    }

    #[test]
    fn test_protocol_values() {
        let cfg = parse(&["--gateway-uid", "GW", "--protocol", "sql-server"])
            .resolve_with(FileDefaults::default());
        assert_eq!(cfg.port(), 1433);
        assert!(Cli::try_parse_from(["pam-onboard", "--gateway-uid", "GW", "--protocol", "vnc"])
            .is_err());
    }

    #[test]
    fn test_schedule_must_be_json() {
        assert!(Cli::try_parse_from([
            "pam-onboard",
            "--gateway-uid",
            "GW",
            "--schedulejson",
            "{not json"
        ])
        .is_err());

        let cli = parse(&["--gateway-uid", "GW", "--schedulejson", "{'type':'WEEKLY'}"]);
        assert_eq!(cli.schedule_json.as_deref(), Some("{'type':'WEEKLY'}"));
    }

    #[test]
    fn test_flags_win_over_file() {
        let file = FileDefaults {
            user_folder: Some("FromFile".into()),
            resource_folder: Some("FileResources".into()),
            protocol: Some(Protocol::Ssh),
            threads: Some(8),
            enable_ssl_verification: Some(true),
            ..FileDefaults::default()
        };
        let cfg = parse(&["--gateway-uid", "GW", "--user-folder", "FromFlag", "--threads", "0"])
            .resolve_with(file);

        assert_eq!(cfg.user_folder, "FromFlag");
        assert_eq!(cfg.resource_folder, "FileResources");
        assert_eq!(cfg.protocol, Protocol::Ssh);
        assert_eq!(cfg.threads, 1);
        assert!(cfg.ssl_verification);
    }

    #[test]
    fn test_empty_optional_values_are_unset() {
        let cfg = parse(&[
            "--gateway-uid",
            "GW",
            "--parent-folder",
            "",
            "--rotation-admin-uid",
            "",
        ])
        .resolve_with(FileDefaults::default());
        assert!(cfg.parent_folder.is_none());
        assert!(cfg.rotation_admin_uid.is_none());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = parse(&["--gateway-uid", "GW", "--config", "/nonexistent/pam.toml"]);
        assert!(cli.resolve().is_err());
    }
}
