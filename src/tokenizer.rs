//! Splits tarpit log lines into tokens and picks out the `key=value` fields
//! the reports care about.
//!
//! A typical pair of lines looks like:
//!
//! ```text
//! endlessh[512]: 2024-01-01T00:00:00.000Z ACCEPT host=::ffff:10.0.0.1 port=51234 fd=4 n=1/4096
//! endlessh[512]: 2024-01-01T00:05:00.000Z CLOSE host=::ffff:10.0.0.1 port=51234 fd=4 time=300.012 bytes=3126
//! ```
use crate::error::LineError;
use std::str::FromStr;

pub const DEFAULT_DELIMITERS: &str = " ";

const HOST_KEY: &str = "host=";
const PORT_KEY: &str = "port=";
const TIME_KEY: &str = "time=";
const BYTES_KEY: &str = "bytes=";
const ACCEPT_MARKER: &str = "ACCEPT";

/// Returns the non-empty substrings of `line` between any of the chars in
/// `delimiters`, in order.
pub fn split_tokens<'a>(line: &'a str, delimiters: &str) -> Vec<&'a str> {
    line.split(|c: char| delimiters.contains(c))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Value of a `key=value` token, if the token carries that key and the value
/// starts with a non-whitespace char.
fn field_value<'a>(token: &'a str, key: &str) -> Option<&'a str> {
    token
        .strip_prefix(key)
        .filter(|value| value.starts_with(|c: char| !c.is_whitespace()))
}

/// The fields found on one line. Numeric fields are kept raw and parsed on
/// demand so a malformed value only costs that one field.
#[derive(Debug, Default, PartialEq)]
pub struct LineFields<'a> {
    pub host: &'a str,
    pub accept: bool,
    port: Option<&'a str>,
    time: Option<&'a str>,
    bytes: Option<&'a str>,
}

impl<'a> LineFields<'a> {
    pub fn parse(line: &'a str) -> Result<Self, LineError> {
        Self::parse_with(line, DEFAULT_DELIMITERS)
    }

    /// Classifies every token of `line`. Repeated keys overwrite each other,
    /// so the last occurrence wins.
    pub fn parse_with(line: &'a str, delimiters: &str) -> Result<Self, LineError> {
        let tokens = split_tokens(line, delimiters);
        if tokens.is_empty() {
            return Err(LineError::NoTokens);
        }

        let mut host = None;
        let mut fields = LineFields::default();
        for token in tokens {
            if let Some(value) = field_value(token, HOST_KEY) {
                host = Some(value);
            } else if token == ACCEPT_MARKER {
                fields.accept = true;
            } else if let Some(value) = field_value(token, PORT_KEY) {
                fields.port = Some(value);
            } else if let Some(value) = field_value(token, TIME_KEY) {
                fields.time = Some(value);
            } else if let Some(value) = field_value(token, BYTES_KEY) {
                fields.bytes = Some(value);
            }
        }

        fields.host = host.ok_or(LineError::MissingHost)?;
        Ok(fields)
    }

    pub fn port(&self) -> Result<Option<u16>, LineError> {
        parse_number("port", self.port)
    }

    /// Seconds the connection was held open. `NaN`, infinities and negative
    /// durations are rejected like any other malformed value.
    pub fn time(&self) -> Result<Option<f64>, LineError> {
        match parse_number::<f64>("time", self.time)? {
            Some(seconds) if !seconds.is_finite() || seconds < 0.0 => Err(LineError::InvalidNumber {
                field: "time",
                value: self.time.unwrap_or_default().to_string(),
            }),
            seconds => Ok(seconds),
        }
    }

    pub fn bytes(&self) -> Result<Option<u64>, LineError> {
        parse_number("bytes", self.bytes)
    }
}

fn parse_number<T: FromStr>(field: &'static str, raw: Option<&str>) -> Result<Option<T>, LineError> {
    raw.map(|value| {
        value.parse().map_err(|_| LineError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    })
    .transpose()
}
