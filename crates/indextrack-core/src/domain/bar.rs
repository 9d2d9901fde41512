use serde::{Deserialize, Deserializer, Serialize};

use crate::{UtcDateTime, ValidationError};

/// One OHLCV observation for a single trading day.
///
/// Price fields are optional: the provider reports non-trading placeholders
/// with null prices, and those must stay distinguishable from a real zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBar {
    pub date: UtcDateTime,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default, deserialize_with = "volume_or_zero")]
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjclose: Option<f64>,
}

impl QuoteBar {
    pub fn new(
        date: UtcDateTime,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("open", open)?;
        validate_optional_finite("high", high)?;
        validate_optional_finite("low", low)?;
        validate_optional_finite("close", close)?;

        if let (Some(high), Some(low)) = (high, low) {
            if high < low {
                return Err(ValidationError::InvalidBarRange);
            }
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adjclose: None,
        })
    }

    pub fn with_adjclose(mut self, adjclose: Option<f64>) -> Result<Self, ValidationError> {
        validate_optional_finite("adjclose", adjclose)?;
        self.adjclose = adjclose;
        Ok(self)
    }

    /// Calendar month bucket of this bar.
    pub fn year_month(&self) -> (i32, u8) {
        self.date.year_month()
    }

    /// `false` for placeholder rows that carry no prices at all.
    pub fn has_prices(&self) -> bool {
        self.open.is_some() || self.high.is_some() || self.low.is_some() || self.close.is_some()
    }
}

fn volume_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
