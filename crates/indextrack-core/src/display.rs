//! Presentation rules for table cells and instrument headers.

use serde::Serialize;
use time::macros::format_description;

use crate::{Granularity, Meta, QuoteBar, UtcDateTime};

/// Cell text for a price the provider did not report.
pub const NO_DATA: &str = "-";

pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => String::from(NO_DATA),
    }
}

/// Volume in thousands with one decimal, e.g. `4748110.0k`.
pub fn format_volume(volume: u64) -> String {
    format!("{:.1}k", volume as f64 / 1000.0)
}

/// `Mar 5, 2024` for daily rows, `Mar 2024` for monthly rows.
pub fn format_row_date(date: UtcDateTime, granularity: Granularity) -> String {
    let inner = date.into_inner();
    let formatted = match granularity {
        Granularity::Daily => {
            inner.format(format_description!("[month repr:short] [day padding:none], [year]"))
        }
        Granularity::Monthly => inner.format(format_description!("[month repr:short] [year]")),
    };
    formatted.unwrap_or_else(|_| date.to_string())
}

/// Price with thousands separators and two decimals, e.g. `5,137.08`.
pub fn format_market_price(value: Option<f64>) -> String {
    let Some(value) = value.filter(|value| value.is_finite()) else {
        return String::from(NO_DATA);
    };

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// Provider market time rendered in UTC.
pub fn format_market_time(meta: &Meta) -> String {
    meta.regular_market_time()
        .and_then(|ts| {
            ts.into_inner()
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
                ))
                .ok()
        })
        .unwrap_or_else(|| String::from(NO_DATA))
}

/// A table row with every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl DisplayRow {
    pub fn from_bar(bar: &QuoteBar, granularity: Granularity) -> Self {
        Self {
            date: format_row_date(bar.date, granularity),
            open: format_price(bar.open),
            high: format_price(bar.high),
            low: format_price(bar.low),
            close: format_price(bar.close),
            volume: format_volume(bar.volume),
        }
    }
}
