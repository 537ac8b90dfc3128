use serde::Serialize;
use std::collections::BTreeMap;

/// Textual prefix of an IPv4 address embedded in IPv6 notation.
pub const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Summary results keyed by host. A `BTreeMap` so reports come out sorted.
pub type SummaryResults = BTreeMap<String, SummaryRecord>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRecord {
    pub accepted: u64,
    pub closed: u64,
}

impl SummaryRecord {
    pub fn add_event(&mut self, accept: bool) {
        if accept {
            self.accepted = self.accepted.saturating_add(1);
        } else {
            self.closed = self.closed.saturating_add(1);
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DetailedRecord {
    pub host: String,
    pub accepted_connections: u64,
    pub closed_connections: u64,
    pub used_ports: Vec<u16>,
    pub total_seconds_wasted: f64,
    pub total_bytes_sent: u64,
}

impl DetailedRecord {
    pub fn new(host: &str) -> Self {
        DetailedRecord {
            host: host.to_string(),
            ..Default::default()
        }
    }

    /// Counts an accepted connection, remembering the peer port when the
    /// line carried one.
    pub fn add_accept(&mut self, port: Option<u16>) {
        self.accepted_connections = self.accepted_connections.saturating_add(1);
        if let Some(port) = port {
            self.used_ports.push(port);
        }
    }

    /// Byte and connection counts saturate at `u64::MAX` instead of wrapping.
    pub fn add_close(&mut self, seconds: Option<f64>, bytes: Option<u64>) {
        self.closed_connections = self.closed_connections.saturating_add(1);
        self.total_seconds_wasted += seconds.unwrap_or_default();
        self.total_bytes_sent = self
            .total_bytes_sent
            .saturating_add(bytes.unwrap_or_default());
    }
}

/// Which of the two aggregations a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Summary,
    Detailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    Summary(SummaryResults),
    Detailed(Vec<DetailedRecord>),
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        match self {
            AggregateResult::Summary(results) => results.is_empty(),
            AggregateResult::Detailed(records) => records.is_empty(),
        }
    }

    pub fn totals(&self) -> Totals {
        match self {
            AggregateResult::Summary(results) => {
                results.values().fold(
                    Totals {
                        unique_hosts: results.len(),
                        ..Default::default()
                    },
                    |mut totals, record| {
                        totals.accepted = totals.accepted.saturating_add(record.accepted);
                        totals.closed = totals.closed.saturating_add(record.closed);
                        totals
                    },
                )
            }
            AggregateResult::Detailed(records) => records.iter().fold(
                Totals {
                    unique_hosts: records.len(),
                    ..Default::default()
                },
                |mut totals, record| {
                    totals.accepted = totals.accepted.saturating_add(record.accepted_connections);
                    totals.closed = totals.closed.saturating_add(record.closed_connections);
                    totals.seconds_wasted += record.total_seconds_wasted;
                    totals.bytes_sent = totals.bytes_sent.saturating_add(record.total_bytes_sent);
                    totals
                },
            ),
        }
    }
}

/// Figures for the connection statistics table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub unique_hosts: usize,
    pub accepted: u64,
    pub closed: u64,
    pub seconds_wasted: f64,
    pub bytes_sent: u64,
}

impl Totals {
    pub fn alive(&self) -> u64 {
        alive_connections(self.accepted, self.closed)
    }
}

/// Connections still held by the tarpit, as shown in the totals table.
pub fn alive_connections(accepted: u64, closed: u64) -> u64 {
    accepted.max(closed) - accepted.min(closed)
}

/// Open/closed figures used in the CSV comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenConnections {
    pub open: u64,
    pub closed: u64,
}

impl OpenConnections {
    /// `open = accepted - closed`. More closes than accepts happens when the
    /// log was rotated while a connection was up; the surplus is then counted
    /// as open and added back to the closed total.
    pub fn from_counts(accepted: u64, closed: u64) -> Self {
        if accepted >= closed {
            OpenConnections {
                open: accepted - closed,
                closed,
            }
        } else {
            let open = closed - accepted;
            OpenConnections {
                open,
                closed: closed.saturating_add(open),
            }
        }
    }
}

/// Strips the IPv4-mapped IPv6 prefix, leaving any other host untouched.
pub fn normalize_host(host: &str) -> &str {
    match host.find(IPV4_MAPPED_PREFIX) {
        Some(offset) => &host[offset + IPV4_MAPPED_PREFIX.len()..],
        None => host,
    }
}
