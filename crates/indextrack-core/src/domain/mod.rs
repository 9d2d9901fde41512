//! # Domain Models
//!
//! Canonical price-history types for indextrack.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuoteBar`] | One trading day's OHLCV, prices optional |
//! | [`Series`] | Bars plus instrument [`Meta`] for one symbol |
//! | [`Granularity`] | Daily or monthly table resolution |
//! | [`Symbol`] | Validated provider ticker |
//! | [`UtcDateTime`] | UTC timestamp |

mod bar;
mod granularity;
mod series;
mod symbol;
mod timestamp;

pub use bar::QuoteBar;
pub use granularity::Granularity;
pub use series::{Meta, Series};
pub use symbol::Symbol;
pub use timestamp::{format_calendar_date, parse_calendar_date, years_before, UtcDateTime};
