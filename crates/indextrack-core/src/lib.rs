//! # Indextrack Core
//!
//! Price-history view-model for the indextrack dashboard.
//!
//! ## Overview
//!
//! - **Domain models** for bars, series metadata, symbols, and granularity
//! - **Monthly reduction** of a daily series ([`reduce::monthly`])
//! - **Paginated table view** over either granularity ([`TableView`])
//! - **Fetch boundary** with classified failures ([`Fetcher`], [`FetchFailure`])
//! - **Per-instrument tracker** with a stale-response guard ([`InstrumentTracker`])
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart and history-proxy fetchers |
//! | [`display`] | Cell and header formatting |
//! | [`domain`] | Domain models (QuoteBar, Series, Meta, Symbol) |
//! | [`error`] | Core error types |
//! | [`fetch`] | Fetcher trait, requests, failure taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`reduce`] | Series reductions |
//! | [`tracker`] | Fetch lifecycle state machine |
//! | [`view`] | Table view and pagination |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use indextrack_core::{Granularity, InstrumentTracker, ProxyFetcher, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = ProxyFetcher::default();
//!     let mut tracker = InstrumentTracker::new("S&P 500");
//!
//!     if let Some(ticket) = tracker.change_symbol(Symbol::parse("^GSPC")?) {
//!         tracker.run(&fetcher, ticket).await;
//!     }
//!
//!     tracker.table_mut().set_granularity(Granularity::Daily);
//!     let page = tracker.page();
//!     println!("page {} of {}", page.current_page, page.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fetcher         │────▶│ HTTP Client      │
//! │ (Yahoo / proxy) │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │ Series
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Instrument      │────▶│ chart consumer   │
//! │ Tracker         │     │ (raw series)     │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ TableView       │  daily: sorted desc / monthly: reduce::monthly
//! │ (page slice)    │
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod display;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod reduce;
pub mod tracker;
pub mod view;

// Fetcher implementations
pub use adapters::{ProxyFetcher, YahooFetcher, DEFAULT_LOOKBACK_YEARS};

// Domain models
pub use domain::{
    format_calendar_date, parse_calendar_date, years_before, Granularity, Meta, QuoteBar, Series,
    Symbol, UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// Fetch boundary
pub use fetch::{FailureKind, FetchConfig, FetchFailure, Fetcher, HistoryRequest};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Lifecycle
pub use tracker::{Completion, FetchState, FetchTicket, InstrumentTracker};

// Table view
pub use view::{TablePage, TableView, ViewState, DEFAULT_PAGE_SIZE};
