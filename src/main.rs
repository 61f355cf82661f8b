use clap::Parser;
use std::process::ExitCode;

use pam_onboard::{app, cli::Cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = match logging::init_logging(&cli.log_dir) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Logging to {}", log_path.display());

    let result = match cli.resolve() {
        Ok(config) => app::run(&config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) => {
            tracing::info!(
                "Done: {} records for {} hosts",
                summary.records,
                summary.hosts
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
