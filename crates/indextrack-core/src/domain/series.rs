use serde::{Deserialize, Serialize};

use crate::{CoreError, QuoteBar, UtcDateTime};

/// Instrument metadata reported alongside a price history.
///
/// Field names follow the provider's chart payload so the same shape decodes
/// from the upstream API and from the history proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub regular_market_time: Option<i64>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub instrument_type: Option<String>,
    #[serde(default)]
    pub first_trade_date: Option<i64>,
    #[serde(default)]
    pub gmtoffset: Option<i64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
    #[serde(default)]
    pub chart_previous_close: Option<f64>,
    #[serde(default)]
    pub price_hint: Option<u32>,
    #[serde(default)]
    pub data_granularity: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub valid_ranges: Vec<String>,
}

impl Meta {
    /// Minimal metadata with only the ticker set.
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            currency: None,
            regular_market_price: None,
            regular_market_time: None,
            exchange_name: None,
            instrument_type: None,
            first_trade_date: None,
            gmtoffset: None,
            timezone: None,
            exchange_timezone_name: None,
            chart_previous_close: None,
            price_hint: None,
            data_granularity: None,
            range: None,
            valid_ranges: Vec::new(),
        }
    }

    pub fn regular_market_time(&self) -> Option<UtcDateTime> {
        self.regular_market_time
            .and_then(|seconds| UtcDateTime::from_unix_seconds(seconds).ok())
    }
}

/// A fetched price history: metadata plus bars in provider order.
///
/// Replaced wholesale on refetch; consumers share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub meta: Meta,
    #[serde(default)]
    pub quotes: Vec<QuoteBar>,
}

impl Series {
    pub fn new(meta: Meta, quotes: Vec<QuoteBar>) -> Self {
        Self { meta, quotes }
    }

    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Most recent bar by date, regardless of delivery order.
    pub fn latest(&self) -> Option<&QuoteBar> {
        self.quotes.iter().max_by_key(|bar| bar.date)
    }
}
