use crate::config::{Config, OutputFormat};
use crate::error::ReportError;
use crate::humanize::{human_bytes, human_time};
use crate::models::{normalize_host, AggregateResult, DetailedRecord, OpenConnections, Totals};
use log::info;
use prettytable::{row, Cell, Row, Table};
use serde::Serialize;
use std::io::Write;

pub const APP_NAME: &str = "Tarpit Reporter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// AbuseIPDB categories: hacking, brute-force, SSH, port scan.
pub const ABUSE_IPDB_CATEGORIES: &str = "18,14,22,15";

const HOST_WIDTHS: [usize; 5] = [24, 10, 8, 16, 13];
const TOTALS_WIDTHS: [usize; 6] = [18, 28, 26, 25, 23, 18];

/// One host as it is shown to the user: prefix stripped, counts flattened.
struct HostRow<'a> {
    host: &'a str,
    accepted: u64,
    closed: u64,
    detail: Option<&'a DetailedRecord>,
}

fn host_rows(result: &AggregateResult) -> Vec<HostRow<'_>> {
    match result {
        AggregateResult::Summary(results) => results
            .iter()
            .map(|(host, record)| HostRow {
                host: normalize_host(host),
                accepted: record.accepted,
                closed: record.closed,
                detail: None,
            })
            .collect(),
        AggregateResult::Detailed(records) => records
            .iter()
            .map(|record| HostRow {
                host: normalize_host(&record.host),
                accepted: record.accepted_connections,
                closed: record.closed_connections,
                detail: Some(record),
            })
            .collect(),
    }
}

pub fn print_report(
    out: &mut impl Write,
    config: &Config,
    result: &AggregateResult,
    timestamp: &str,
) -> Result<(), ReportError> {
    let rows = host_rows(result);
    let detailed = matches!(result, AggregateResult::Detailed(_));

    match config.output {
        OutputFormat::Tables {
            ip_stats,
            connection_stats,
            pretty,
        } => {
            if config.advertisement {
                writeln!(out, "# Report generated by {} at {}", APP_NAME, timestamp)?;
            }
            if ip_stats {
                writeln!(out, "# Statistics per IP")?;
                if pretty {
                    print_pretty_ip_table(out, &rows, detailed)?;
                } else {
                    print_markdown_ip_table(out, &rows, detailed)?;
                }
                writeln!(out)?;
            }
            if connection_stats {
                writeln!(out, "# Connection Statistics")?;
                let totals = result.totals();
                if pretty {
                    print_pretty_totals_table(out, &totals)?;
                } else {
                    print_markdown_totals_table(out, &totals)?;
                }
            }
            Ok(())
        }
        OutputFormat::AbuseIpDb => print_abuse_ipdb_csv(out, &rows, config.advertisement, timestamp),
        OutputFormat::Json => print_json(out, &rows, &result.totals(), timestamp),
    }
}

/// Pads `text` with spaces so it sits in the middle of a `width` wide cell.
fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = (width / 2).saturating_sub(len / 2);
    let right = width.saturating_sub(len + left);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn markdown_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(&centered(cell, *width));
        line.push('|');
    }
    line
}

fn markdown_separator(widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in widths {
        line.push_str(&"-".repeat(*width));
        line.push('|');
    }
    line
}

fn host_cells(row: &HostRow, detailed: bool) -> Vec<String> {
    let mut cells = vec![
        row.host.to_string(),
        row.accepted.to_string(),
        row.closed.to_string(),
    ];
    if detailed {
        let (seconds, bytes) = row
            .detail
            .map(|d| (d.total_seconds_wasted, d.total_bytes_sent))
            .unwrap_or_default();
        cells.push(human_time(seconds));
        cells.push(human_bytes(bytes));
    }
    cells
}

fn host_headers(detailed: bool) -> Vec<String> {
    let mut headers = vec!["Host", "Accepted", "Closed"];
    if detailed {
        headers.extend(&["Total Time (s)", "Total Bytes"]);
    }
    headers.into_iter().map(String::from).collect()
}

fn print_markdown_ip_table(
    out: &mut impl Write,
    rows: &[HostRow],
    detailed: bool,
) -> Result<(), ReportError> {
    let widths = if detailed {
        &HOST_WIDTHS[..]
    } else {
        &HOST_WIDTHS[..3]
    };
    let mut table = String::new();
    table.push_str(&markdown_line(&host_headers(detailed), widths));
    table.push('\n');
    table.push_str(&markdown_separator(widths));
    table.push('\n');
    for row in rows {
        table.push_str(&markdown_line(&host_cells(row, detailed), widths));
        table.push('\n');
    }
    write!(out, "{}", table)?;
    Ok(())
}

/// Header and value cells of the totals table. Time and bytes only show up
/// when something was recorded for them.
fn totals_cells(totals: &Totals) -> (Vec<String>, Vec<String>) {
    let mut headers = vec![
        "Total Unique IPs".to_string(),
        "Total Accepted Connections".to_string(),
        "Total Closed Connections".to_string(),
        "Total Alive Connections".to_string(),
    ];
    let mut values = vec![
        totals.unique_hosts.to_string(),
        totals.accepted.to_string(),
        totals.closed.to_string(),
        totals.alive().to_string(),
    ];
    if totals.seconds_wasted > 0.0 {
        headers.push("Total Bot Time Wasted".to_string());
        values.push(human_time(totals.seconds_wasted));
    }
    if totals.bytes_sent > 0 {
        headers.push("Total Bytes Sent".to_string());
        values.push(human_bytes(totals.bytes_sent));
    }
    (headers, values)
}

fn print_markdown_totals_table(out: &mut impl Write, totals: &Totals) -> Result<(), ReportError> {
    let (headers, values) = totals_cells(totals);
    let mut widths = TOTALS_WIDTHS[..4].to_vec();
    if totals.seconds_wasted > 0.0 {
        widths.push(TOTALS_WIDTHS[4]);
    }
    if totals.bytes_sent > 0 {
        widths.push(TOTALS_WIDTHS[5]);
    }
    writeln!(out, "{}", markdown_line(&headers, &widths))?;
    writeln!(out, "{}", markdown_separator(&widths))?;
    writeln!(out, "{}", markdown_line(&values, &widths))?;
    Ok(())
}

fn print_pretty_ip_table(
    out: &mut impl Write,
    rows: &[HostRow],
    detailed: bool,
) -> Result<(), ReportError> {
    let mut table = Table::new();
    if detailed {
        table.add_row(row!["HOST", "ACCEPTED", "CLOSED", "TOTAL TIME", "TOTAL BYTES"]);
    } else {
        table.add_row(row!["HOST", "ACCEPTED", "CLOSED"]);
    }
    for host in rows {
        let cells = host_cells(host, detailed);
        table.add_row(Row::new(cells.iter().map(|c| Cell::new(c)).collect()));
    }
    write!(out, "{}", table)?;
    Ok(())
}

fn print_pretty_totals_table(out: &mut impl Write, totals: &Totals) -> Result<(), ReportError> {
    let (headers, values) = totals_cells(totals);
    let mut table = Table::new();
    table.add_row(Row::new(
        headers.iter().map(|h| Cell::new(&h.to_uppercase())).collect(),
    ));
    table.add_row(Row::new(values.iter().map(|v| Cell::new(v)).collect()));
    write!(out, "{}", table)?;
    Ok(())
}

#[derive(Serialize)]
struct AbuseIpDbRow<'a> {
    #[serde(rename = "IP")]
    ip: &'a str,
    #[serde(rename = "Categories")]
    categories: &'a str,
    #[serde(rename = "ReportDate")]
    report_date: &'a str,
    #[serde(rename = "Comment")]
    comment: String,
}

fn abuse_comment(row: &HostRow, advertisement: bool) -> String {
    let counts = OpenConnections::from_counts(row.accepted, row.closed);
    let mut comment = format!(
        "{} fell into Endlessh tarpit; {}/{} total connections are currently still open.",
        row.host, counts.open, counts.closed
    );
    if let Some(detail) = row.detail {
        comment.push_str(&format!(
            " Total time wasted: {}. Total bytes sent by tarpit: {}.",
            human_time(detail.total_seconds_wasted),
            human_bytes(detail.total_bytes_sent)
        ));
    }
    if advertisement {
        comment.push_str(&format!(" Report generated by {} v{}", APP_NAME, APP_VERSION));
    }
    comment
}

fn print_abuse_ipdb_csv(
    out: &mut impl Write,
    rows: &[HostRow],
    advertisement: bool,
    timestamp: &str,
) -> Result<(), ReportError> {
    info!("Using categories for hacking, brute-force, sshd, port sniffing");
    // the header goes out even when no host was found
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(&mut *out);
    writer.write_record(&["IP", "Categories", "ReportDate", "Comment"])?;
    for row in rows {
        writer.serialize(AbuseIpDbRow {
            ip: row.host,
            categories: ABUSE_IPDB_CATEGORIES,
            report_date: timestamp,
            comment: abuse_comment(row, advertisement),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonHost<'a> {
    host: &'a str,
    accepted: u64,
    closed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    used_ports: Option<&'a [u16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds_wasted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_sent: Option<u64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: &'a str,
    hosts: Vec<JsonHost<'a>>,
    totals: &'a Totals,
    alive_connections: u64,
}

fn print_json(
    out: &mut impl Write,
    rows: &[HostRow],
    totals: &Totals,
    timestamp: &str,
) -> Result<(), ReportError> {
    let report = JsonReport {
        generated_at: timestamp,
        hosts: rows
            .iter()
            .map(|row| JsonHost {
                host: row.host,
                accepted: row.accepted,
                closed: row.closed,
                used_ports: row.detail.map(|d| d.used_ports.as_slice()),
                seconds_wasted: row.detail.map(|d| d.total_seconds_wasted),
                bytes_sent: row.detail.map(|d| d.total_bytes_sent),
            })
            .collect(),
        totals,
        alive_connections: totals.alive(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
