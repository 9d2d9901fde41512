//! CLI argument definitions for indextrack.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `SYMBOLS...` | `^GSPC ACWI` | Instruments to show |
//! | `--api-url` | `http://localhost:3001` | History proxy base URL |
//! | `--direct` | `false` | Fetch from the chart API, bypassing the proxy |
//! | `--granularity` | `monthly` | Table granularity (daily, monthly) |
//! | `--page` | `1` | Table page to print |
//! | `--period1` | proxy default | First day of history (`YYYY-MM-DD`) |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--retries` | `0` | Extra attempts for a failed instrument |
//! | `--format` | `table` | Output format (table, json) |
//!
//! # Examples
//!
//! ```bash
//! # Default dashboard through a local proxy
//! indextrack
//!
//! # Second page of daily rows for one index
//! indextrack ^IXIC --granularity daily --page 2
//!
//! # Machine-readable output straight from the provider
//! indextrack ACWI --direct --format json --pretty
//! ```

use clap::{Parser, ValueEnum};
use indextrack_core::fetch::PROXY_BASE_URL;
use indextrack_core::Granularity;

/// Stock index tracker for the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "indextrack",
    author,
    version,
    about = "Stock index tracker for the terminal",
    long_about = "Shows the latest price and a paginated daily or monthly history table \
for each tracked instrument. Without arguments it tracks the S&P 500 (^GSPC) and the \
iShares MSCI ACWI ETF (ACWI)."
)]
pub struct Cli {
    /// Symbols to track, e.g. ^GSPC ACWI 0700.HK.
    pub symbols: Vec<String>,

    /// Base URL of the history proxy.
    #[arg(long, default_value = PROXY_BASE_URL)]
    pub api_url: String,

    /// Fetch from the chart API directly instead of through the proxy.
    #[arg(long, default_value_t = false)]
    pub direct: bool,

    /// Table granularity.
    #[arg(long, value_enum, default_value_t = GranularityArg::Monthly)]
    pub granularity: GranularityArg,

    /// Table page to print, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// First day of history, `YYYY-MM-DD` or RFC3339.
    #[arg(long)]
    pub period1: Option<String>,

    /// Request timeout budget in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Times a failed instrument is fetched again before giving up.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Output format.
    ///
    /// - table: header and history table per instrument
    /// - json: one object per instrument with meta, chart and table
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    Daily,
    Monthly,
}

impl From<GranularityArg> for Granularity {
    fn from(value: GranularityArg) -> Self {
        match value {
            GranularityArg::Daily => Granularity::Daily,
            GranularityArg::Monthly => Granularity::Monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
