//! Server configuration.
//!
//! | Flag | Default | Description |
//! |------|---------|-------------|
//! | `--bind` | `127.0.0.1:3001` | Listen address |
//! | `--upstream-url` | `https://query1.finance.yahoo.com` | Chart API base URL |
//! | `--timeout-ms` | `10000` | Upstream request timeout |
//! | `--lookback-years` | `5` | Window used when `period1` is absent |

use std::net::SocketAddr;

use clap::Parser;
use indextrack_core::fetch::YAHOO_BASE_URL;
use indextrack_core::{FetchConfig, YahooFetcher, DEFAULT_LOOKBACK_YEARS};

pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

/// History proxy for the indextrack dashboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "indextrack-server", version, about)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Base URL of the chart API.
    #[arg(long, default_value = YAHOO_BASE_URL)]
    pub upstream_url: String,

    /// Upstream request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Years of history served when a request has no `period1`.
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_YEARS)]
    pub lookback_years: u16,
}

impl ServerConfig {
    pub fn fetcher(&self) -> YahooFetcher {
        let config =
            FetchConfig::with_base_url(self.upstream_url.as_str()).with_timeout_ms(self.timeout_ms);
        YahooFetcher::new(config).with_lookback_years(self.lookback_years)
    }
}
