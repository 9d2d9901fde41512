//! Loads every tracked instrument concurrently, one tracker per task.

use std::sync::Arc;

use indextrack_core::{
    parse_calendar_date, FetchConfig, Fetcher, Granularity, InstrumentTracker, ProxyFetcher,
    Symbol, TableView, YahooFetcher,
};
use time::Date;

use crate::cli::Cli;
use crate::error::CliError;

/// One row of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: Symbol,
    pub title: String,
    pub description: Option<String>,
}

impl Instrument {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            title: symbol.to_string(),
            symbol,
            description: None,
        }
    }

    fn titled(symbol: Symbol, title: &str, description: &str) -> Self {
        Self {
            symbol,
            title: title.to_owned(),
            description: Some(description.to_owned()),
        }
    }
}

/// The pair shown when no symbols are given.
pub fn default_instruments() -> Result<Vec<Instrument>, CliError> {
    Ok(vec![
        Instrument::titled(
            Symbol::parse("^GSPC")?,
            "S&P 500",
            "Standard & Poor's 500 Index",
        ),
        Instrument::titled(
            Symbol::parse("ACWI")?,
            "All Country (ACWI)",
            "iShares MSCI ACWI ETF",
        ),
    ])
}

pub fn instruments(cli: &Cli) -> Result<Vec<Instrument>, CliError> {
    if cli.symbols.is_empty() {
        return default_instruments();
    }

    let mut instruments: Vec<Instrument> = Vec::with_capacity(cli.symbols.len());
    for raw in &cli.symbols {
        let symbol = Symbol::parse(raw)?;
        if instruments.iter().any(|known| known.symbol == symbol) {
            continue;
        }
        instruments.push(Instrument::new(symbol));
    }
    Ok(instruments)
}

pub fn fetcher(cli: &Cli) -> Arc<dyn Fetcher> {
    if cli.direct {
        let config = FetchConfig::yahoo().with_timeout_ms(cli.timeout_ms);
        Arc::new(YahooFetcher::new(config))
    } else {
        let config = FetchConfig::with_base_url(cli.api_url.as_str()).with_timeout_ms(cli.timeout_ms);
        Arc::new(ProxyFetcher::new(config))
    }
}

/// A loaded instrument ready to render.
#[derive(Debug, Clone)]
pub struct Panel {
    pub instrument: Instrument,
    pub tracker: InstrumentTracker,
}

impl Panel {
    pub fn failed(&self) -> bool {
        self.tracker.failure().is_some()
    }
}

/// Table and fetch settings applied to every tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub granularity: Granularity,
    pub page: usize,
    pub range_start: Option<Date>,
    pub retries: u32,
}

impl LoadOptions {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let range_start = cli
            .period1
            .as_deref()
            .map(parse_calendar_date)
            .transpose()?;

        Ok(Self {
            granularity: cli.granularity.into(),
            page: cli.page,
            range_start,
            retries: cli.retries,
        })
    }
}

/// Fetch all instruments concurrently; panels come back in input order.
pub async fn load(
    instruments: Vec<Instrument>,
    fetcher: Arc<dyn Fetcher>,
    options: LoadOptions,
) -> Result<Vec<Panel>, CliError> {
    let handles: Vec<_> = instruments
        .into_iter()
        .map(|instrument| tokio::spawn(track(instrument, Arc::clone(&fetcher), options)))
        .collect();

    let mut panels = Vec::with_capacity(handles.len());
    for handle in handles {
        panels.push(handle.await?);
    }
    Ok(panels)
}

async fn track(
    instrument: Instrument,
    fetcher: Arc<dyn Fetcher>,
    options: LoadOptions,
) -> Panel {
    let table = TableView::new().with_granularity(options.granularity);
    let mut tracker = InstrumentTracker::with_table(instrument.title.as_str(), table);
    tracker.set_range_start(options.range_start);

    let mut retries_left = options.retries;
    let mut ticket = tracker.change_symbol(instrument.symbol.clone());
    while let Some(current) = ticket.take() {
        tracker.run(fetcher.as_ref(), current).await;

        if tracker.failure().is_some() && retries_left > 0 {
            retries_left -= 1;
            tracing::info!(title = %tracker.title(), retries_left, "retrying failed instrument");
            ticket = tracker.retry();
        }
    }

    if options.page != 1 && !tracker.table_mut().set_page(options.page) {
        tracing::warn!(
            title = %tracker.title(),
            page = options.page,
            total_pages = tracker.table().total_pages(),
            "requested page is out of range, showing page 1"
        );
    }
    Panel {
        instrument,
        tracker,
    }
}
