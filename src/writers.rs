//! Output files: the import JSON and three command lists.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

use crate::command::ShellCommand;
use crate::config::RunConfig;
use crate::models::{admin_title, HostEntry, ImportDocument};

pub const IMPORT_JSON: &str = "pam_records_import.json";
pub const SETUP_COMMANDS: &str = "pam_setup_commands.txt";
pub const CONNECTION_COMMANDS: &str = "pam_connection_commands.txt";
pub const ROTATION_COMMANDS: &str = "pam_rotation_commands.txt";

#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    dry_run: bool,
    generated_at: DateTime<Utc>,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self::at(dir, dry_run, Utc::now())
    }

    /// Writer whose header timestamp is fixed to `generated_at`.
    pub fn at(dir: impl Into<PathBuf>, dry_run: bool, generated_at: DateTime<Utc>) -> Self {
        Self {
            dir: dir.into(),
            dry_run,
            generated_at,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Overwrite `name` with `content`, or only log it on a dry run.
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_for(name);
        if self.dry_run {
            tracing::info!("[DRY-RUN] Would write {}", path.display());
            return Ok(path);
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn write_import_json(&self, document: &ImportDocument) -> Result<PathBuf> {
        let json =
            serde_json::to_string_pretty(document).context("Failed to serialize records")?;
        self.write_file(IMPORT_JSON, &json)
    }

    pub fn write_setup_commands(&self, config: &RunConfig) -> Result<PathBuf> {
        let content = self.render("SETUP", &setup_commands(config));
        self.write_file(SETUP_COMMANDS, &content)
    }

    pub fn write_connection_commands(
        &self,
        entries: &[HostEntry],
        config: &RunConfig,
    ) -> Result<PathBuf> {
        let content = self.render("CONNECTIONS", &connection_commands(entries, config));
        self.write_file(CONNECTION_COMMANDS, &content)
    }

    pub fn write_rotation_commands(
        &self,
        entries: &[HostEntry],
        config: &RunConfig,
    ) -> Result<PathBuf> {
        let content = self.render("ROTATION", &rotation_commands(entries, config));
        self.write_file(ROTATION_COMMANDS, &content)
    }

    pub fn header(&self, title: &str) -> String {
        format!(
            "# ==== {} generated {} ===",
            title,
            self.generated_at.format("%Y-%m-%dT%H:%MZ")
        )
    }

    fn render(&self, title: &str, commands: &[ShellCommand]) -> String {
        let mut out = self.header(title);
        out.push_str("\n\n");
        for cmd in commands {
            out.push_str(&cmd.to_string());
            out.push('\n');
        }
        out
    }
}

fn folder_path(folder: &str) -> String {
    format!("/{}", folder)
}

fn machine_path(config: &RunConfig, host: &str) -> String {
    format!("/{}/{}", config.resource_folder, host)
}

fn admin_path(config: &RunConfig, host: &str) -> String {
    format!("/{}/{}", config.user_folder, admin_title(host))
}

pub fn setup_commands(config: &RunConfig) -> Vec<ShellCommand> {
    let mut cmds = vec![
        ShellCommand::new(["keeper", "import", IMPORT_JSON]).opt("--format", "json"),
        ShellCommand::new(["keeper", "pam", "config", "new"])
            .opt("--environment", "local")
            .opt_quoted("--title", format!("Config for {}", config.resource_folder))
            .opt_quoted("--shared-folder", config.resource_folder.as_str())
            .opt("-g", config.gateway_uid.as_str())
            .flag("--connections=on")
            .flag("--rotation=on"),
    ];

    // Import cannot create nested shared folders, so they are moved afterwards.
    if let Some(parent) = &config.parent_folder {
        for folder in [&config.user_folder, &config.resource_folder] {
            cmds.push(
                ShellCommand::new(["keeper", "folder", "move"])
                    .quoted(folder_path(folder))
                    .quoted(format!("/{}/{}", parent, folder)),
            );
        }
    }
    cmds
}

pub fn connection_commands(entries: &[HostEntry], config: &RunConfig) -> Vec<ShellCommand> {
    entries
        .iter()
        .map(|entry| {
            ShellCommand::new(["keeper", "pam", "connection", "edit"])
                .quoted(machine_path(config, &entry.hostname))
                .opt_quoted("--config", folder_path(&config.resource_folder))
                .opt_quoted("--admin-user", admin_path(config, &entry.hostname))
                .opt("--protocol", config.protocol.as_str())
                .opt("--connections", "on")
                .opt("--connections-override-port", config.port().to_string())
        })
        .collect()
}

pub fn rotation_commands(entries: &[HostEntry], config: &RunConfig) -> Vec<ShellCommand> {
    let schedule = config.normalized_schedule();
    entries
        .iter()
        .map(|entry| {
            let mut cmd = ShellCommand::new(["keeper", "pam", "rotation", "set"])
                .opt_quoted("--record", admin_path(config, &entry.hostname))
                .opt_quoted("--resource", machine_path(config, &entry.hostname))
                .opt_quoted("--config", folder_path(&config.resource_folder))
                .flag("--enable");
            if let Some(admin) = &config.rotation_admin_uid {
                cmd = cmd.opt("--admin-user", admin.as_str());
            }
            cmd.opt_single_quoted("-sj", schedule.as_str())
        })
        .collect()
}
