//! Per-instrument fetch lifecycle.
//!
//! An [`InstrumentTracker`] owns one instrument's [`FetchState`] and its
//! [`TableView`]. Fetches start only through [`InstrumentTracker::change_symbol`]
//! and [`InstrumentTracker::retry`], each handing out a [`FetchTicket`]. At
//! most one ticket is live at a time; a completion whose ticket is no longer
//! live (superseded generation or a different symbol) is dropped as stale.
//!
//! | From | Action | To |
//! |------|--------|----|
//! | any | `change_symbol(new)` | `Fetching(new)` |
//! | `Ready` / `Failed` | `retry()` | `Fetching(current)` |
//! | `Fetching(s)` | `complete(live ticket, Ok)` | `Ready` |
//! | `Fetching(s)` | `complete(live ticket, Err)` | `Failed` |
//! | any | `complete(stale ticket, _)` | unchanged |

use std::sync::Arc;

use time::Date;

use crate::fetch::{FetchFailure, Fetcher, HistoryRequest};
use crate::view::{TablePage, TableView};
use crate::{QuoteBar, Series, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Fetching { symbol: Symbol },
    Ready(Arc<Series>),
    Failed(FetchFailure),
}

impl FetchState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching { .. } => "fetching",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    request: HistoryRequest,
}

impl FetchTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol(&self) -> &Symbol {
        &self.request.symbol
    }

    pub fn request(&self) -> &HistoryRequest {
        &self.request
    }
}

/// Outcome of handing a result back to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct InstrumentTracker {
    title: String,
    symbol: Option<Symbol>,
    range_start: Option<Date>,
    generation: u64,
    in_flight: Option<u64>,
    state: FetchState,
    table: TableView,
}

impl InstrumentTracker {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_table(title, TableView::new())
    }

    pub fn with_table(title: impl Into<String>, table: TableView) -> Self {
        Self {
            title: title.into(),
            symbol: None,
            range_start: None,
            generation: 0,
            in_flight: None,
            state: FetchState::Idle,
            table,
        }
    }

    /// First day requested by subsequent fetches; `None` leaves the window
    /// to the fetcher.
    pub fn set_range_start(&mut self, range_start: Option<Date>) {
        self.range_start = range_start;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn series(&self) -> Option<&Arc<Series>> {
        match &self.state {
            FetchState::Ready(series) => Some(series),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match &self.state {
            FetchState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Raw bars in provider order for chart consumers, independent of the
    /// table's granularity and page.
    pub fn chart_series(&self) -> Option<&[QuoteBar]> {
        self.series().map(|series| series.quotes.as_slice())
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableView {
        &mut self.table
    }

    pub fn page(&self) -> TablePage {
        self.table.page()
    }

    /// Track `symbol` and start fetching it.
    ///
    /// Returns `None` when `symbol` is already tracked; use [`Self::retry`]
    /// to refetch it.
    pub fn change_symbol(&mut self, symbol: Symbol) -> Option<FetchTicket> {
        if self.symbol.as_ref() == Some(&symbol) {
            return None;
        }

        tracing::debug!(title = %self.title, %symbol, "tracked symbol changed");
        self.symbol = Some(symbol.clone());
        self.table.clear_series();
        Some(self.begin(symbol))
    }

    /// Refetch the tracked symbol. Returns `None` when nothing is tracked or
    /// a fetch is already in flight.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let symbol = self.symbol.clone()?;
        if self.in_flight.is_some() {
            return None;
        }
        Some(self.begin(symbol))
    }

    /// Apply a fetch result if `ticket` is still the live one.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Series, FetchFailure>,
    ) -> Completion {
        let live = self.in_flight == Some(ticket.generation)
            && self.symbol.as_ref() == Some(ticket.symbol());
        if !live {
            tracing::debug!(
                title = %self.title,
                symbol = %ticket.symbol(),
                generation = ticket.generation,
                "discarding stale fetch result"
            );
            return Completion::Stale;
        }

        self.in_flight = None;
        match result {
            Ok(series) => {
                tracing::info!(
                    title = %self.title,
                    symbol = %ticket.symbol(),
                    bars = series.len(),
                    "history loaded"
                );
                let series = Arc::new(series);
                self.table.set_series(Arc::clone(&series));
                self.state = FetchState::Ready(series);
            }
            Err(failure) => {
                tracing::warn!(
                    title = %self.title,
                    symbol = %ticket.symbol(),
                    kind = %failure.kind(),
                    "history fetch failed: {}",
                    failure.message()
                );
                self.table.clear_series();
                self.state = FetchState::Failed(failure);
            }
        }
        Completion::Applied
    }

    /// Run `ticket` against `fetcher` and apply the result.
    pub async fn run<F>(&mut self, fetcher: &F, ticket: FetchTicket) -> Completion
    where
        F: Fetcher + ?Sized,
    {
        let result = fetcher.fetch(ticket.request().clone()).await;
        self.complete(ticket, result)
    }

    fn begin(&mut self, symbol: Symbol) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = FetchState::Fetching {
            symbol: symbol.clone(),
        };

        FetchTicket {
            generation: self.generation,
            request: HistoryRequest::new(symbol).with_range_start(self.range_start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Meta;

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("valid symbol")
    }

    #[test]
    fn starts_idle_without_fetching() {
        let mut tracker = InstrumentTracker::new("S&P 500");
        assert_eq!(tracker.state().as_str(), "idle");
        assert!(tracker.retry().is_none());
        assert!(tracker.chart_series().is_none());
    }

    #[test]
    fn ticket_carries_range_start() {
        let mut tracker = InstrumentTracker::new("ACWI");
        let start = time::macros::date!(2020 - 01 - 01);
        tracker.set_range_start(Some(start));

        let ticket = tracker.change_symbol(symbol("ACWI")).expect("fetch starts");
        assert_eq!(ticket.request().range_start, Some(start));
        assert_eq!(ticket.generation(), 1);
    }

    #[test]
    fn retry_is_refused_while_in_flight() {
        let mut tracker = InstrumentTracker::new("ACWI");
        let ticket = tracker.change_symbol(symbol("ACWI")).expect("fetch starts");
        assert!(tracker.retry().is_none());

        tracker.complete(ticket, Ok(Series::new(Meta::for_symbol("ACWI"), Vec::new())));
        assert!(!tracker.is_fetching());
        assert!(tracker.retry().is_some());
    }
}
