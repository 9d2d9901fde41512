use std::io::Write;

use indextrack_core::display::{format_market_price, format_market_time, DisplayRow, NO_DATA};
use indextrack_core::{FetchFailure, Granularity, InstrumentTracker, Meta, QuoteBar};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::dashboard::Panel;
use crate::error::CliError;

const COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

pub fn render<W: Write>(
    panels: &[Panel],
    format: OutputFormat,
    pretty: bool,
    out: &mut W,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            for (index, panel) in panels.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                render_panel(panel, out)?;
            }
        }
        OutputFormat::Json => {
            let payload: Vec<PanelJson<'_>> = panels.iter().map(PanelJson::from).collect();
            let text = if pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
}

fn render_panel<W: Write>(panel: &Panel, out: &mut W) -> Result<(), CliError> {
    let tracker = &panel.tracker;
    let symbol = panel.instrument.symbol.as_str();

    writeln!(out, "{} ({symbol})", tracker.title())?;
    if let Some(description) = &panel.instrument.description {
        writeln!(out, "{description}")?;
    }

    if let Some(failure) = tracker.failure() {
        writeln!(out, "Error loading data for {symbol}: {}", failure.message())?;
        writeln!(out, "Run again to retry, or pass --retries <N>.")?;
        return Ok(());
    }

    if let Some(series) = tracker.series() {
        writeln!(out, "{}", price_line(&series.meta))?;
        writeln!(out, "Last updated: {}", format_market_time(&series.meta))?;
    }
    writeln!(out)?;

    let page = tracker.page();
    writeln!(out, "{} - {} Data", tracker.title(), page.granularity.label())?;
    let rows: Vec<DisplayRow> = page
        .rows
        .iter()
        .map(|bar| DisplayRow::from_bar(bar, page.granularity))
        .collect();
    write_table(&rows, out)?;
    writeln!(out, "Page {} of {}", page.current_page, page.total_pages)?;
    Ok(())
}

fn price_line(meta: &Meta) -> String {
    let price = format_market_price(meta.regular_market_price);
    match meta.currency.as_deref() {
        Some(currency) if price != NO_DATA => format!("{price} {currency}"),
        _ => price,
    }
}

fn write_table<W: Write>(rows: &[DisplayRow], out: &mut W) -> Result<(), CliError> {
    let cells: Vec<[&str; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.date.as_str(),
                row.open.as_str(),
                row.high.as_str(),
                row.low.as_str(),
                row.close.as_str(),
                row.volume.as_str(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_line(&COLUMNS, &widths, out)?;
    for line in &cells {
        write_line(line, &widths, out)?;
    }
    Ok(())
}

/// Date is left-aligned, numbers right-aligned.
fn write_line<W: Write>(
    cells: &[&str; 6],
    widths: &[usize; 6],
    out: &mut W,
) -> Result<(), CliError> {
    let mut line = format!("{:<width$}", cells[0], width = widths[0]);
    for (cell, &width) in cells.iter().zip(widths).skip(1) {
        line.push_str(&format!("  {cell:>width$}"));
    }
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct PanelJson<'a> {
    symbol: &'a str,
    title: &'a str,
    state: &'static str,
    meta: Option<&'a Meta>,
    chart: Option<&'a [QuoteBar]>,
    table: TableJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson<'a>>,
}

#[derive(Debug, Serialize)]
struct TableJson {
    granularity: Granularity,
    current_page: usize,
    total_pages: usize,
    rows: Vec<DisplayRow>,
}

#[derive(Debug, Serialize)]
struct ErrorJson<'a> {
    kind: &'static str,
    code: &'static str,
    message: &'a str,
}

impl<'a> From<&'a Panel> for PanelJson<'a> {
    fn from(panel: &'a Panel) -> Self {
        let tracker: &'a InstrumentTracker = &panel.tracker;
        let page = tracker.page();
        let rows = page
            .rows
            .iter()
            .map(|bar| DisplayRow::from_bar(bar, page.granularity))
            .collect();

        Self {
            symbol: panel.instrument.symbol.as_str(),
            title: tracker.title(),
            state: tracker.state().as_str(),
            meta: tracker.series().map(|series| &series.meta),
            chart: tracker.chart_series(),
            table: TableJson {
                granularity: page.granularity,
                current_page: page.current_page,
                total_pages: page.total_pages,
                rows,
            },
            error: tracker.failure().map(ErrorJson::from),
        }
    }
}

impl<'a> From<&'a FetchFailure> for ErrorJson<'a> {
    fn from(failure: &'a FetchFailure) -> Self {
        Self {
            kind: failure.kind().as_str(),
            code: failure.code(),
            message: failure.message(),
        }
    }
}
