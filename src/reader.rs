use crate::config::LogSource;
use crate::error::ReportError;
use log::info;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    iter,
};

/// Substring that marks a line as coming from the tarpit.
pub const TARPIT_MARKER: &str = "endlessh";

/// Lazily keeps the lines carrying the tarpit marker, in their original order.
pub fn filter_tarpit_lines<I, S>(lines: I) -> impl Iterator<Item = S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| line.as_ref().contains(TARPIT_MARKER))
}

/// Reads `buffer_reader` to the end and keeps the tarpit lines.
///
/// Takes a `BufRead` so tests can pass a `&[u8]`. Invalid UTF-8 is replaced
/// rather than rejected; syslog files are not guaranteed to be clean.
pub fn read_tarpit_lines(buffer_reader: &mut impl BufRead) -> Result<Vec<String>, ReportError> {
    let mut buf = Vec::new();
    let mut read_error = None;

    let decoded = iter::from_fn(|| {
        buf.clear();
        match buffer_reader.read_until(b'\n', &mut buf) {
            // end of input
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                Some(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string())
            }
            Err(e) => {
                read_error = Some(e);
                None
            }
        }
    });
    let lines: Vec<String> = filter_tarpit_lines(decoded).collect();

    match read_error {
        Some(e) => Err(ReportError::Read(e)),
        None => Ok(lines),
    }
}

/// Opens the configured source and returns its tarpit lines. The file handle
/// is dropped before returning, on success and on failure.
pub fn read_log(source: &LogSource) -> Result<Vec<String>, ReportError> {
    match source {
        LogSource::File(path) => {
            info!("Reading tarpit log from {}", path.display());
            let file = File::open(path).map_err(|source| ReportError::Open {
                path: path.clone(),
                source,
            })?;
            read_tarpit_lines(&mut BufReader::new(file))
        }
        LogSource::Stdin => {
            info!("Reading tarpit log from stdin");
            let stdin = io::stdin();
            let mut handle = stdin.lock();
            read_tarpit_lines(&mut handle)
        }
    }
}
