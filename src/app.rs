use anyhow::Result;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::Error;
use crate::models::ImportDocument;
use crate::writers::OutputWriter;
use crate::{csv_loader, probe, records};

/// Counts and paths from a finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub loaded: usize,
    pub processed: usize,
    pub hosts: usize,
    pub records: usize,
    pub outputs: Vec<PathBuf>,
}

/// Load, optionally probe, generate and write. Any error aborts the run;
/// files written before the failure stay on disk.
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    if !config.output_dir.is_dir() {
        return Err(Error::OutputDirMissing(config.output_dir.clone()).into());
    }

    let mut entries = csv_loader::load(&config.csv_path)?;
    let loaded = entries.len();

    if config.connectivity_check {
        tracing::info!(
            "Running best-effort TCP {} probe on {} hosts",
            config.probe_port,
            entries.len()
        );
        let (port, timeout) = (config.probe_port, config.probe_timeout);
        entries = probe::filter_reachable(entries, config.threads, move |host: String| async move {
            probe::probe(&host, port, timeout).await
        })
        .await;
    }
    tracing::info!("Processing {} servers", entries.len());

    let generated = records::generate(&entries, config);
    let (hosts, record_count) = (generated.hosts.len(), generated.records.len());
    let document = ImportDocument::new(generated.records);

    let writer = OutputWriter::new(&config.output_dir, config.dry_run);
    let outputs = vec![
        writer.write_import_json(&document)?,
        writer.write_setup_commands(config)?,
        writer.write_connection_commands(&entries, config)?,
        writer.write_rotation_commands(&entries, config)?,
    ];

    Ok(RunSummary {
        loaded,
        processed: entries.len(),
        hosts,
        records: record_count,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::writers;

    const SCENARIO: &str = "hostname,initial_admin_user,initial_admin_password\n\
                            web1,admin,Pw1!\n\
                            web1,admin,Pw2!\n\
                            db1,,Pw3!\n\
                            app1,root,Pw4!\n";

    fn config_in(dir: &Path) -> RunConfig {
        let csv = dir.join("servers.csv");
        fs::write(&csv, SCENARIO).unwrap();
        let mut config = RunConfig::with_gateway("GW");
        config.csv_path = csv;
        config.output_dir = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_run_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.protocol = crate::config::Protocol::Mysql;

        let summary = run(&config).await.unwrap();
        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.hosts, 2);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.outputs.len(), 4);

        let json = fs::read_to_string(dir.path().join(writers::IMPORT_JSON)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value["records"].as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3]["title"], "app1");
        assert_eq!(records[3]["custom_fields"]["$pamHostname"]["port"], "3306");

        let connections =
            fs::read_to_string(dir.path().join(writers::CONNECTION_COMMANDS)).unwrap();
        assert!(connections.contains("--protocol mysql"));
    }

    #[tokio::test]
    async fn test_run_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::with_gateway("GW");
        config.csv_path = dir.path().join("missing.csv");
        config.output_dir = dir.path().to_path_buf();

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::CsvNotFound(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.output_dir = dir.path().join("out");

        let err = run(&config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::OutputDirMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_run_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.dry_run = true;

        let summary = run(&config).await.unwrap();
        assert_eq!(summary.records, 4);
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["servers.csv"]);
    }

    #[tokio::test]
    async fn test_run_connectivity_check_drops_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        fs::write(
            &config.csv_path,
            "hostname,initial_admin_user,initial_admin_password\n\
             a.invalid,admin,pw\n\
             b.invalid,admin,pw\n",
        )
        .unwrap();
        config.connectivity_check = true;
        config.probe_timeout = std::time::Duration::from_millis(500);

        let summary = run(&config).await.unwrap();
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.records, 0);

        let json = fs::read_to_string(dir.path().join(writers::IMPORT_JSON)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records"], serde_json::json!([]));

        let rotation = fs::read_to_string(dir.path().join(writers::ROTATION_COMMANDS)).unwrap();
        assert_eq!(rotation.lines().count(), 2);
    }
}
