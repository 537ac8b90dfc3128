use crate::error::LineError;
use crate::models::{AggregateResult, DetailedRecord, ReportMode, SummaryResults};
use crate::tokenizer::LineFields;
use log::{debug, info, warn};

pub fn aggregate<I, S>(lines: I, mode: ReportMode) -> AggregateResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match mode {
        ReportMode::Summary => AggregateResult::Summary(summarize(lines)),
        ReportMode::Detailed => AggregateResult::Detailed(detail(lines)),
    }
}

/// Counts accepted and closed connections per host.
pub fn summarize<I, S>(lines: I) -> SummaryResults
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut results = SummaryResults::new();
    for line in lines {
        let line = line.as_ref();
        if let Some(fields) = parse_line(line) {
            results
                .entry(fields.host.to_string())
                .or_default()
                .add_event(fields.accept);
        }
    }
    info!("Summarized connections from {} hosts", results.len());
    results
}

/// Builds one detailed record per host, in the order hosts first appear.
pub fn detail<I, S>(lines: I) -> Vec<DetailedRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records: Vec<DetailedRecord> = Vec::new();
    for line in lines {
        let line = line.as_ref();
        let fields = match parse_line(line) {
            Some(fields) => fields,
            None => continue,
        };

        // Distinct attacker hosts stay few, a linear scan keeps first-seen order.
        let index = match records.iter().position(|r| r.host == fields.host) {
            Some(index) => index,
            None => {
                records.push(DetailedRecord::new(fields.host));
                records.len() - 1
            }
        };
        let record = &mut records[index];

        if fields.accept {
            record.add_accept(field_or_warn(fields.port(), line));
        } else {
            record.add_close(
                field_or_warn(fields.time(), line),
                field_or_warn(fields.bytes(), line),
            );
        }
    }
    info!("Collected detailed records for {} hosts", records.len());
    records
}

fn parse_line(line: &str) -> Option<LineFields<'_>> {
    match LineFields::parse(line) {
        Ok(fields) => Some(fields),
        Err(LineError::MissingHost) => {
            debug!("Skipping line without host: {}", line);
            None
        }
        Err(e) => {
            warn!("Failed to parse {:?}: {}", line, e);
            None
        }
    }
}

/// A malformed numeric field is dropped; the rest of the line still counts.
fn field_or_warn<T>(field: Result<Option<T>, LineError>, line: &str) -> Option<T> {
    field.unwrap_or_else(|e| {
        warn!("Ignoring field in {:?}: {}", line, e);
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryRecord;

    const ACCEPT_LINE: &str = "endlessh[1]: ACCEPT host=10.0.0.1 port=4 time=0";
    const CLOSE_LINE: &str = "endlessh[1]: host=10.0.0.1 time=2.3 bytes=512";

    #[test]
    fn it_summarizes_an_accept_and_close_pair() {
        let results = summarize(vec![ACCEPT_LINE, CLOSE_LINE]);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results.get("10.0.0.1"),
            Some(&SummaryRecord {
                accepted: 1,
                closed: 1
            })
        );
    }

    #[test]
    fn it_counts_a_close_seen_before_any_accept() {
        let results = summarize(vec![CLOSE_LINE, CLOSE_LINE]);
        assert_eq!(results["10.0.0.1"].closed, 2);
        assert_eq!(results["10.0.0.1"].accepted, 0);
    }

    #[test]
    fn it_sorts_summary_results_by_host() {
        let results = summarize(vec![
            "endlessh: ACCEPT host=192.168.0.9 port=1",
            "endlessh: ACCEPT host=10.0.0.1 port=1",
            "endlessh: ACCEPT host=::ffff:8.8.8.8 port=1",
        ]);
        let hosts: Vec<_> = results.keys().map(String::as_str).collect();
        assert_eq!(hosts, vec!["10.0.0.1", "192.168.0.9", "::ffff:8.8.8.8"]);
    }

    #[test]
    fn it_treats_hosts_as_case_sensitive_exact_strings() {
        let results = summarize(vec!["host=fe80::A ACCEPT", "host=fe80::a ACCEPT"]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn it_ignores_lines_without_host() {
        let lines: Vec<String> = (0..10)
            .map(|i| format!("endlessh[1]: ACCEPT port={} time=1 bytes=2", i))
            .collect();
        assert!(summarize(&lines).is_empty());
        assert!(detail(&lines).is_empty());
    }

    #[test]
    fn it_skips_lines_without_tokens() {
        let results = summarize(vec!["", "   ", ACCEPT_LINE]);
        assert_eq!(results["10.0.0.1"].accepted, 1);
    }

    #[test]
    fn it_details_an_accept_and_close_pair() {
        let records = detail(vec![
            "endlessh: host=1.2.3.4 ACCEPT",
            "endlessh: host=1.2.3.4 port=22 time=1.5 bytes=100",
        ]);
        assert_eq!(
            records,
            vec![DetailedRecord {
                host: "1.2.3.4".to_string(),
                accepted_connections: 1,
                closed_connections: 1,
                used_ports: vec![],
                total_seconds_wasted: 1.5,
                total_bytes_sent: 100,
            }]
        );
    }

    #[test]
    fn it_keeps_first_seen_order_in_detailed_mode() {
        let records = detail(vec![
            "endlessh: ACCEPT host=192.168.0.9 port=1",
            "endlessh: ACCEPT host=10.0.0.1 port=2",
            "endlessh: CLOSE host=192.168.0.9 time=1 bytes=1",
        ]);
        let hosts: Vec<_> = records.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["192.168.0.9", "10.0.0.1"]);
    }

    #[test]
    fn it_records_one_port_per_accept_with_a_port() {
        let records = detail(vec![
            "endlessh: ACCEPT host=a port=22",
            "endlessh: ACCEPT host=a port=2222",
            "endlessh: ACCEPT host=a port=22",
            "endlessh: ACCEPT host=a",
            "endlessh: CLOSE host=a time=3 bytes=4",
        ]);
        let record = &records[0];
        assert_eq!(record.accepted_connections, 4);
        assert_eq!(record.used_ports, vec![22, 2222, 22]);
        assert_eq!(record.closed_connections, 1);
    }

    #[test]
    fn it_skips_malformed_numeric_fields_only() {
        let records = detail(vec![
            "endlessh: ACCEPT host=a port=99999",
            "endlessh: CLOSE host=a time=abc bytes=10",
        ]);
        let record = &records[0];
        assert_eq!(record.accepted_connections, 1);
        assert!(record.used_ports.is_empty());
        assert_eq!(record.closed_connections, 1);
        assert_eq!(record.total_seconds_wasted, 0.0);
        assert_eq!(record.total_bytes_sent, 10);
    }

    #[test]
    fn it_saturates_bytes_sent_instead_of_overflowing() {
        let records = detail(vec![
            "endlessh: CLOSE host=a time=1 bytes=18446744073709551615",
            "endlessh: CLOSE host=a time=1 bytes=1",
        ]);
        let record = &records[0];
        assert_eq!(record.closed_connections, 2);
        assert_eq!(record.total_bytes_sent, u64::MAX);
        assert_eq!(record.total_seconds_wasted, 2.0);
    }

    #[test]
    fn it_skips_times_that_are_not_a_finite_duration() {
        let records = detail(vec![
            "endlessh: CLOSE host=a time=NaN bytes=1",
            "endlessh: CLOSE host=a time=inf bytes=1",
            "endlessh: CLOSE host=a time=-4 bytes=1",
            "endlessh: CLOSE host=a time=2 bytes=1",
        ]);
        let record = &records[0];
        assert_eq!(record.closed_connections, 4);
        assert_eq!(record.total_seconds_wasted, 2.0);
        assert_eq!(record.total_bytes_sent, 4);
    }

    #[test]
    fn it_dispatches_on_the_report_mode() {
        let lines = [ACCEPT_LINE, CLOSE_LINE];
        match aggregate(&lines, ReportMode::Summary) {
            AggregateResult::Summary(results) => assert_eq!(results.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        match aggregate(&lines, ReportMode::Detailed) {
            AggregateResult::Detailed(records) => {
                assert_eq!(records[0].total_bytes_sent, 512);
                assert_eq!(records[0].used_ports, vec![4]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
