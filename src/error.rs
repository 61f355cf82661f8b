use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("CSV file not found: {}", .0.display())]
    CsvNotFound(PathBuf),

    #[error("invalid schedule JSON: {0}")]
    InvalidSchedule(String),

    #[error("output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),
}
