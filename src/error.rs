use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that stop a run. Nothing is printed to stdout once one of these
/// has been returned.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read the log source: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to write the report: {0}")]
    Write(#[from] io::Error),
    #[error("Failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems with a single log line. These never abort a run: the line (or
/// the single field) is skipped and the aggregation carries on.
#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    #[error("no tokens found")]
    NoTokens,
    #[error("no host= token found")]
    MissingHost,
    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
