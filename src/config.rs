use crate::models::ReportMode;
use std::path::PathBuf;

pub const DEFAULT_LOG_PATH: &str = "/var/log/syslog";

#[derive(Debug, Clone, PartialEq)]
pub enum LogSource {
    File(PathBuf),
    Stdin,
}

impl Default for LogSource {
    fn default() -> Self {
        LogSource::File(PathBuf::from(DEFAULT_LOG_PATH))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    /// Markdown tables. Either table can be switched off; `pretty` swaps the
    /// markdown layout for box-drawn tables.
    Tables {
        ip_stats: bool,
        connection_stats: bool,
        pretty: bool,
    },
    /// CSV accepted by AbuseIPDB's bulk report endpoint.
    AbuseIpDb,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Tables {
            ip_stats: true,
            connection_stats: true,
            pretty: false,
        }
    }
}

/// Everything a run needs, built once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: LogSource,
    pub mode: ReportMode,
    pub output: OutputFormat,
    pub advertisement: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: LogSource::default(),
            mode: ReportMode::Summary,
            output: OutputFormat::default(),
            advertisement: true,
        }
    }
}
