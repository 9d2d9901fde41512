use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::fetch::{send, FetchConfig, FetchFailure, Fetcher, HistoryRequest};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{years_before, Meta, QuoteBar, Series, UtcDateTime};

/// Default history window when a request carries no range start.
pub const DEFAULT_LOOKBACK_YEARS: u16 = 5;

/// Fetches daily history from the Yahoo Finance v8 chart endpoint.
#[derive(Clone)]
pub struct YahooFetcher {
    http_client: Arc<dyn HttpClient>,
    config: FetchConfig,
    lookback_years: u16,
}

impl Default for YahooFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::yahoo())
    }
}

impl YahooFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: FetchConfig) -> Self {
        Self {
            http_client,
            config,
            lookback_years: DEFAULT_LOOKBACK_YEARS,
        }
    }

    pub fn with_lookback_years(mut self, lookback_years: u16) -> Self {
        self.lookback_years = lookback_years;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn chart_url(&self, request: &HistoryRequest, now: OffsetDateTime) -> String {
        let today = now.date();
        let start = request.range_start.unwrap_or_else(|| {
            years_before(today, self.lookback_years).unwrap_or(Date::MIN)
        });

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%7Csplit&includeAdjustedClose=true",
            self.config.base_url,
            urlencoding::encode(request.symbol.as_str()),
            UtcDateTime::start_of(start).unix_seconds(),
            now.unix_timestamp(),
        )
    }

    async fn fetch_chart(&self, request: HistoryRequest) -> Result<Series, FetchFailure> {
        let url = self.chart_url(&request, OffsetDateTime::now_utc());
        tracing::debug!(symbol = %request.symbol, %url, "requesting yahoo chart");

        let response = send(self.http_client.as_ref(), self.config.request(url)).await?;

        if !response.is_success() {
            let detail = serde_json::from_str::<ChartEnvelope>(&response.body)
                .ok()
                .and_then(|envelope| envelope.chart.error)
                .map(|error| error.describe())
                .unwrap_or_else(|| String::from("no error detail"));
            return Err(FetchFailure::provider_status(
                response.status,
                format!("yahoo returned status {}: {detail}", response.status),
            ));
        }

        parse_chart(&response.body)
    }
}

impl Fetcher for YahooFetcher {
    fn fetch<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, FetchFailure>> + Send + 'a>> {
        Box::pin(self.fetch_chart(request))
    }
}

/// Decode a chart payload into a [`Series`].
pub fn parse_chart(body: &str) -> Result<Series, FetchFailure> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchFailure::parse(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = envelope.chart.error {
        return Err(FetchFailure::provider(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let result = envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| FetchFailure::parse("no chart data in response"))?;

    into_series(result)
}

fn into_series(result: ChartResult) -> Result<Series, FetchFailure> {
    let ChartResult {
        meta,
        timestamp,
        indicators,
    } = result;

    // Symbols without trading history come back with no timestamps at all.
    if timestamp.is_empty() {
        return Ok(Series::new(meta, Vec::new()));
    }

    let len = timestamp.len();
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchFailure::parse("no quote data"))?;
    let adjclose = indicators
        .adjclose
        .into_iter()
        .next()
        .map(|column| column.adjclose)
        .unwrap_or_default();

    for (field, column_len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
        ("volume", quote.volume.len()),
    ] {
        if column_len != len {
            return Err(FetchFailure::parse(format!(
                "quote column '{field}' has {column_len} values for {len} timestamps"
            )));
        }
    }
    if !adjclose.is_empty() && adjclose.len() != len {
        return Err(FetchFailure::parse(format!(
            "adjclose column has {} values for {len} timestamps",
            adjclose.len()
        )));
    }

    let mut quotes: Vec<QuoteBar> = Vec::with_capacity(len);
    for (index, &seconds) in timestamp.iter().enumerate() {
        let date = UtcDateTime::from_unix_seconds(seconds)
            .map_err(|e| FetchFailure::parse(format!("invalid timestamp: {e}")))?;
        let volume = quote.volume[index]
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value.round() as u64)
            .unwrap_or(0);

        let bar = QuoteBar::new(
            date,
            quote.open[index],
            quote.high[index],
            quote.low[index],
            quote.close[index],
            volume,
        )
        .and_then(|bar| bar.with_adjclose(adjclose.get(index).copied().flatten()));

        let bar = match bar {
            Ok(bar) => bar,
            Err(error) => {
                tracing::warn!(symbol = %meta.symbol, %date, "skipping invalid bar: {error}");
                continue;
            }
        };

        // The in-progress session can repeat the last trading day; keep the
        // later row so dates stay unique.
        match quotes.last_mut() {
            Some(previous) if previous.date.date() == bar.date.date() => {
                tracing::debug!(symbol = %meta.symbol, %date, "replacing duplicate trading day");
                *previous = bar;
            }
            _ => quotes.push(bar),
        }
    }

    Ok(Series::new(meta, quotes))
}

#[derive(Debug, Clone, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl ChartError {
    fn describe(&self) -> String {
        match (self.code.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{}: {}", self.code, self.description),
            (false, true) => self.code.clone(),
            (true, false) => self.description.clone(),
            (true, true) => String::from("unspecified error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
