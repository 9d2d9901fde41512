//! Behavior-driven tests for the per-instrument fetch lifecycle.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use indextrack_core::{
    Completion, FailureKind, FetchFailure, FetchState, Fetcher, Granularity, HistoryRequest,
    InstrumentTracker, Meta, QuoteBar, Series, Symbol, UtcDateTime,
};

fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid symbol")
}

fn daily_series(ticker: &str, days: u32) -> Series {
    let start = UtcDateTime::parse("2024-01-02T14:30:00Z")
        .expect("timestamp")
        .unix_seconds();
    let quotes = (0..days)
        .map(|day| {
            let date = UtcDateTime::from_unix_seconds(start + i64::from(day) * 86_400)
                .expect("in range");
            let close = 100.0 + f64::from(day);
            QuoteBar::new(date, Some(close), Some(close + 1.0), Some(close - 1.0), Some(close), 5)
                .expect("valid bar")
        })
        .collect();
    Series::new(Meta::for_symbol(ticker), quotes)
}

/// Answers per symbol from a fixed script and counts calls.
struct ScriptedFetcher {
    script: HashMap<String, Result<Series, FetchFailure>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(entries: Vec<(&str, Result<Series, FetchFailure>)>) -> Self {
        Self {
            script: entries
                .into_iter()
                .map(|(ticker, outcome)| (ticker.to_owned(), outcome))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, FetchFailure>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .get(request.symbol.as_str())
            .cloned()
            .unwrap_or_else(|| Err(FetchFailure::provider("unknown symbol")));
        Box::pin(async move {
            tokio::task::yield_now().await;
            outcome
        })
    }
}

// =============================================================================
// Stale-response guard
// =============================================================================

#[test]
fn late_response_for_a_replaced_symbol_is_discarded() {
    // Given: a tracker that switched from A to B before A's fetch returned
    let mut tracker = InstrumentTracker::new("Index");
    let ticket_a = tracker.change_symbol(symbol("AAA")).expect("fetch A");
    let ticket_b = tracker.change_symbol(symbol("BBB")).expect("fetch B");

    // When: B completes, then A's response arrives late
    let applied = tracker.complete(ticket_b, Ok(daily_series("BBB", 12)));
    let late = tracker.complete(ticket_a, Ok(daily_series("AAA", 3)));

    // Then: B's data stays on display
    assert_eq!(applied, Completion::Applied);
    assert_eq!(late, Completion::Stale);
    assert_eq!(tracker.state().as_str(), "ready");
    assert_eq!(tracker.series().map(|s| s.meta.symbol.as_str()), Some("BBB"));
    assert_eq!(tracker.chart_series().map(<[QuoteBar]>::len), Some(12));
}

#[test]
fn stale_response_arriving_first_does_not_end_the_fetch() {
    // Given: A replaced by B
    let mut tracker = InstrumentTracker::new("Index");
    let ticket_a = tracker.change_symbol(symbol("AAA")).expect("fetch A");
    let ticket_b = tracker.change_symbol(symbol("BBB")).expect("fetch B");

    // When: A's failure lands before B's result
    let late = tracker.complete(ticket_a, Err(FetchFailure::network("timed out")));

    // Then: the tracker is still fetching B
    assert_eq!(late, Completion::Stale);
    assert_eq!(
        tracker.state(),
        &FetchState::Fetching {
            symbol: symbol("BBB")
        }
    );
    assert!(tracker.failure().is_none());

    assert_eq!(
        tracker.complete(ticket_b, Ok(daily_series("BBB", 1))),
        Completion::Applied
    );
}

#[test]
fn superseded_retry_of_the_same_symbol_is_stale() {
    // Given: a failed fetch retried, then the symbol re-selected after a detour
    let mut tracker = InstrumentTracker::new("Index");
    let first = tracker.change_symbol(symbol("AAA")).expect("fetch");
    tracker.complete(first, Err(FetchFailure::network("offline")));

    let retry = tracker.retry().expect("retry");
    tracker.change_symbol(symbol("BBB")).expect("detour");
    let current = tracker.change_symbol(symbol("AAA")).expect("back to A");

    // Then: only the newest ticket for A applies
    assert_eq!(
        tracker.complete(retry, Ok(daily_series("AAA", 2))),
        Completion::Stale
    );
    assert_eq!(
        tracker.complete(current, Ok(daily_series("AAA", 4))),
        Completion::Applied
    );
    assert_eq!(tracker.chart_series().map(<[QuoteBar]>::len), Some(4));
}

// =============================================================================
// Failure and retry
// =============================================================================

#[tokio::test]
async fn failure_hides_the_table_until_a_retry_succeeds() {
    // Given: a tracker whose fetch fails
    let failing = ScriptedFetcher::new(vec![(
        "ACWI",
        Err(FetchFailure::provider_status(502, "bad gateway")),
    )]);
    let mut tracker = InstrumentTracker::new("All Country (ACWI)");
    let ticket = tracker.change_symbol(symbol("ACWI")).expect("fetch");

    // When: the fetch completes
    tracker.run(&failing, ticket).await;

    // Then: the failure is recorded with its kind and no rows are shown
    let failure = tracker.failure().expect("failed");
    assert_eq!(failure.kind(), FailureKind::Provider);
    assert!(tracker.table().visible_rows().is_empty());
    assert!(tracker.chart_series().is_none());
    assert_eq!(tracker.page().total_pages, 1);

    // When: retrying against a recovered upstream
    let recovered = ScriptedFetcher::new(vec![("ACWI", Ok(daily_series("ACWI", 30)))]);
    let ticket = tracker.retry().expect("retry from failed");
    assert!(tracker.is_fetching());
    let completion = tracker.run(&recovered, ticket).await;

    // Then: data is displayed
    assert_eq!(completion, Completion::Applied);
    assert!(tracker.failure().is_none());
    assert_eq!(tracker.table().visible_rows().len(), 1);
}

#[test]
fn retry_while_fetching_starts_nothing() {
    let mut tracker = InstrumentTracker::new("Index");
    assert!(tracker.retry().is_none(), "nothing tracked yet");

    let ticket = tracker.change_symbol(symbol("^GSPC")).expect("fetch");
    assert!(tracker.retry().is_none(), "fetch already in flight");

    tracker.complete(ticket, Ok(daily_series("^GSPC", 5)));
    assert!(tracker.retry().is_some(), "refresh after ready");
}

#[test]
fn reselecting_the_tracked_symbol_does_not_refetch() {
    let mut tracker = InstrumentTracker::new("Index");
    let ticket = tracker.change_symbol(symbol("^GSPC")).expect("fetch");
    tracker.complete(ticket, Ok(daily_series("^GSPC", 5)));

    assert!(tracker.change_symbol(symbol("^GSPC")).is_none());
    assert_eq!(tracker.state().as_str(), "ready");
}

#[tokio::test]
async fn view_settings_survive_a_refetch() {
    // Given: a daily view on page 3 of a 30-bar series
    let fetcher = ScriptedFetcher::new(vec![("^GSPC", Ok(daily_series("^GSPC", 30)))]);
    let mut tracker = InstrumentTracker::new("S&P 500");
    let ticket = tracker.change_symbol(symbol("^GSPC")).expect("fetch");
    tracker.run(&fetcher, ticket).await;
    tracker.table_mut().set_granularity(Granularity::Daily);
    assert!(tracker.table_mut().set_page(3));

    // When: the same symbol is refreshed
    let ticket = tracker.retry().expect("refresh");
    tracker.run(&fetcher, ticket).await;

    // Then: granularity and page are kept
    let page = tracker.page();
    assert_eq!(page.granularity, Granularity::Daily);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(fetcher.calls(), 2);
}

// =============================================================================
// Independent instruments
// =============================================================================

#[tokio::test]
async fn instruments_load_and_fail_independently() {
    // Given: one upstream that serves ^GSPC and rejects ACWI
    let fetcher = ScriptedFetcher::new(vec![
        ("^GSPC", Ok(daily_series("^GSPC", 25))),
        ("ACWI", Err(FetchFailure::parse("truncated payload"))),
    ]);
    let mut index = InstrumentTracker::new("S&P 500");
    let mut world = InstrumentTracker::new("All Country (ACWI)");
    let index_ticket = index.change_symbol(symbol("^GSPC")).expect("fetch");
    let world_ticket = world.change_symbol(symbol("ACWI")).expect("fetch");

    // When: both fetches run concurrently
    let (index_done, world_done) = tokio::join!(
        index.run(&fetcher, index_ticket),
        world.run(&fetcher, world_ticket)
    );

    // Then: each tracker reflects only its own outcome
    assert_eq!(index_done, Completion::Applied);
    assert_eq!(world_done, Completion::Applied);
    assert_eq!(index.state().as_str(), "ready");
    assert_eq!(world.state().as_str(), "failed");
    assert_eq!(
        world.failure().map(FetchFailure::kind),
        Some(FailureKind::Parse)
    );

    // And: paging one tracker leaves the other untouched
    index.table_mut().set_granularity(Granularity::Daily);
    assert!(index.table_mut().set_page(3));
    assert_eq!(index.page().rows.len(), 5);
    assert_eq!(world.page().current_page, 1);
    assert_eq!(fetcher.calls(), 2);
}
