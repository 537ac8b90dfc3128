pub mod aggregator;
pub mod config;
pub mod error;
pub mod humanize;
pub mod models;
pub mod printer;
pub mod reader;
pub mod tokenizer;

use crate::config::Config;
use crate::error::ReportError;
use log::warn;
use std::io::{self, Write};

/// Reads the configured log, aggregates it and writes the report to stdout.
/// Nothing is written when the log can't be read.
pub fn start(config: &Config) -> Result<(), ReportError> {
    let lines = reader::read_log(&config.source)?;
    let result = aggregator::aggregate(&lines, config.mode);
    if result.is_empty() {
        warn!("No tarpit connections found in {} log lines", lines.len());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    printer::print_report(&mut out, config, &result, &humanize::current_iso_timestamp())?;
    out.flush()?;
    Ok(())
}
