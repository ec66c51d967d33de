use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "influx-reporter")]
#[command(about = "Forward load-test statistics reports to InfluxDB")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "reporter.toml")]
    pub config: String,

    /// Recorded run (JSON output or newline-delimited reports); stdin when omitted
    #[arg(short, long)]
    pub input: Option<String>,

    /// Delay between replayed reports, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Print the line protocol instead of writing to InfluxDB
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
