//! Paginated table view over a price series.
//!
//! [`TableView`] combines the raw series with a [`ViewState`] and keeps the
//! visible rows for the active granularity cached. The cache is rebuilt
//! whenever the series or the granularity changes, so a page is never cut
//! from a stale series.

use std::sync::Arc;

use serde::Serialize;

use crate::reduce;
use crate::{Granularity, QuoteBar, Series};

/// Rows per page in the history table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// User-controlled table state for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub granularity: Granularity,
    /// 1-indexed.
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// The slice handed to a table renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub rows: Vec<QuoteBar>,
    pub current_page: usize,
    pub total_pages: usize,
    pub granularity: Granularity,
}

impl TablePage {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableView {
    series: Option<Arc<Series>>,
    state: ViewState,
    rows: Vec<QuoteBar>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero page size is treated as one.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: ViewState {
                page_size: page_size.max(1),
                ..ViewState::default()
            },
            ..Self::default()
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.set_granularity(granularity);
        self
    }

    /// Replace the underlying series.
    ///
    /// The page number is kept unless the new series has fewer pages, in
    /// which case it is clamped to the last page.
    pub fn set_series(&mut self, series: Arc<Series>) {
        self.series = Some(series);
        self.rebuild();
        self.clamp_page();
    }

    pub fn clear_series(&mut self) {
        self.series = None;
        self.rebuild();
        self.clamp_page();
    }

    pub fn series(&self) -> Option<&Arc<Series>> {
        self.series.as_ref()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn granularity(&self) -> Granularity {
        self.state.granularity
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    /// Switch granularity and go back to the first page, even when the
    /// granularity is unchanged.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        if granularity != self.state.granularity {
            self.state.granularity = granularity;
            self.rebuild();
        }
        self.state.current_page = 1;
    }

    /// Move to `page` if it lies in `1..=total_pages()`; out-of-range
    /// requests are ignored. Returns whether the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() || page == self.state.current_page {
            return false;
        }
        self.state.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.state.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.state.current_page.saturating_sub(1))
    }

    /// All rows for the active granularity, newest first.
    pub fn visible_rows(&self) -> &[QuoteBar] {
        &self.rows
    }

    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.state.page_size).max(1)
    }

    pub fn current_page_rows(&self) -> &[QuoteBar] {
        let start = (self.state.current_page - 1).saturating_mul(self.state.page_size);
        if start >= self.rows.len() {
            return &[];
        }
        let end = start
            .saturating_add(self.state.page_size)
            .min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn page(&self) -> TablePage {
        TablePage {
            rows: self.current_page_rows().to_vec(),
            current_page: self.state.current_page,
            total_pages: self.total_pages(),
            granularity: self.state.granularity,
        }
    }

    fn rebuild(&mut self) {
        let bars = self
            .series
            .as_deref()
            .map(|series| series.quotes.as_slice())
            .unwrap_or_default();

        self.rows = match self.state.granularity {
            Granularity::Daily => reduce::sort_descending(bars),
            Granularity::Monthly => reduce::monthly(bars),
        };
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        if self.state.current_page > total {
            tracing::debug!(
                from = self.state.current_page,
                to = total,
                "clamping table page after series replacement"
            );
            self.state.current_page = total;
        }
    }
}
