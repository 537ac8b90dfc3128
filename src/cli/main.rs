use log::{error, warn};
use std::path::PathBuf;
use structopt::StructOpt;
use tarpit_reporter::config::{Config, LogSource, OutputFormat, DEFAULT_LOG_PATH};
use tarpit_reporter::models::ReportMode;

#[derive(StructOpt, PartialEq, Debug)]
#[structopt(
    name("🕳  Tarpit Reporter"),
    long_about("🧰  Aggregates SSH tarpit logs into per-host connection reports")
)]
pub struct Cli {
    /// Log file to read
    #[structopt(short = "S", long, default_value = DEFAULT_LOG_PATH, parse(from_os_str))]
    pub syslog: PathBuf,
    /// Read the log from stdin instead of a file
    #[structopt(short, long)]
    pub stdin: bool,
    /// Don't print IP statistics
    #[structopt(short = "i", long)]
    pub no_ip_stats: bool,
    /// Don't print connection statistics
    #[structopt(short = "c", long)]
    pub no_cn_stats: bool,
    /// Output AbuseIPDB-compatible CSV instead of tables
    #[structopt(short, long)]
    pub abuse_ipdb: bool,
    /// Output JSON instead of tables
    #[structopt(short, long, conflicts_with = "abuse-ipdb")]
    pub json: bool,
    /// Leave the "Report generated by" notice out
    #[structopt(short, long)]
    pub no_ad: bool,
    /// Include ports, time wasted and bytes sent per host
    #[structopt(short, long)]
    pub detailed: bool,
    /// If set, tables are drawn as pretty tables instead of markdown
    #[structopt(short, long)]
    pub pretty_print: bool,
}

impl Cli {
    pub fn into_config(self) -> Config {
        let source = if self.stdin {
            LogSource::Stdin
        } else {
            LogSource::File(self.syslog)
        };
        let mode = if self.detailed {
            ReportMode::Detailed
        } else {
            ReportMode::Summary
        };
        let output = if self.abuse_ipdb {
            warn!("Disabling markdown-compatible output tables for AbuseIPDB compatibility!");
            OutputFormat::AbuseIpDb
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tables {
                ip_stats: !self.no_ip_stats,
                connection_stats: !self.no_cn_stats,
                pretty: self.pretty_print,
            }
        };
        Config {
            source,
            mode,
            output,
            advertisement: !self.no_ad,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Cli::from_args().into_config();
    if let Err(e) = tarpit_reporter::start(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
