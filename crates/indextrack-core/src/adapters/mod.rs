//! Fetcher implementations.

pub mod proxy;
pub mod yahoo;

pub use proxy::ProxyFetcher;
pub use yahoo::{YahooFetcher, DEFAULT_LOOKBACK_YEARS};
