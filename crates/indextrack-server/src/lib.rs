//! # Indextrack Server
//!
//! Thin HTTP proxy in front of the chart API so browser and terminal
//! clients never talk to the provider directly.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/history/{symbol}?period1=YYYY-MM-DD` | Daily history from `period1` to today |
//!
//! Responses are the [`Series`] JSON. Every upstream failure becomes
//! `500 {"error": "Failed to fetch stock data"}`.

pub mod config;
pub mod error;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use indextrack_core::{
    parse_calendar_date, years_before, Fetcher, HistoryRequest, Series, Symbol, UtcDateTime,
    DEFAULT_LOOKBACK_YEARS,
};
use serde::Deserialize;
use time::Date;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use config::ServerConfig;
pub use error::{LaunchError, ServerError};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<dyn Fetcher>,
    lookback_years: u16,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            lookback_years: DEFAULT_LOOKBACK_YEARS,
        }
    }

    pub fn with_lookback_years(mut self, lookback_years: u16) -> Self {
        self.lookback_years = lookback_years;
        self
    }

    /// First day served when the client sends no `period1`.
    fn default_range_start(&self) -> Date {
        years_before(UtcDateTime::now().date(), self.lookback_years).unwrap_or(Date::MIN)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub period1: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/history/:symbol", get(history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn history(
    State(state): State<AppState>,
    Path(raw_symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Series>, ServerError> {
    let symbol = Symbol::parse(&raw_symbol)?;
    let range_start = match query.period1.as_deref() {
        Some(value) => parse_calendar_date(value).map_err(|_| ServerError::InvalidPeriod1 {
            value: value.to_owned(),
        })?,
        None => state.default_range_start(),
    };

    let request = HistoryRequest::new(symbol.clone()).with_range_start(Some(range_start));
    match state.fetcher.fetch(request).await {
        Ok(series) => {
            tracing::info!(%symbol, bars = series.len(), "served history");
            Ok(Json(series))
        }
        Err(failure) => {
            tracing::warn!(
                %symbol,
                kind = %failure.kind(),
                status = ?failure.status(),
                "error fetching data: {}",
                failure.message()
            );
            Err(ServerError::Upstream(failure))
        }
    }
}

/// Bind `config.bind` and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<(), LaunchError> {
    let state = AppState::new(Arc::new(config.fetcher())).with_lookback_years(config.lookback_years);

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| LaunchError::Bind {
            addr: config.bind,
            source,
        })?;
    tracing::info!(addr = %config.bind, upstream = %config.upstream_url, "server is running");

    axum::serve(listener, router(state))
        .await
        .map_err(LaunchError::Serve)
}
