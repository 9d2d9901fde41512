//! Series reductions used by the table view.

use std::collections::BTreeMap;

use crate::QuoteBar;

/// One bar per calendar month: the month's latest bar, newest month first.
///
/// Grouping uses the full `(year, month)` key, so December of different
/// years never merge. The emitted bar is the month's most recent bar
/// verbatim; there is no OHLC roll-up and volumes are not summed.
pub fn monthly(bars: &[QuoteBar]) -> Vec<QuoteBar> {
    let mut latest: BTreeMap<(i32, u8), &QuoteBar> = BTreeMap::new();

    for bar in bars {
        latest
            .entry(bar.year_month())
            .and_modify(|current| {
                if bar.date > current.date {
                    *current = bar;
                }
            })
            .or_insert(bar);
    }

    // Keys ascend by month and every bar sits inside its own month, so the
    // reversed values are already in descending date order.
    latest.into_values().rev().cloned().collect()
}

/// Copy of `bars` ordered newest first.
pub fn sort_descending(bars: &[QuoteBar]) -> Vec<QuoteBar> {
    let mut sorted = bars.to_vec();
    sorted.sort_by(|left, right| right.date.cmp(&left.date));
    sorted
}
