//! Terminal rendering of computed trades.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::RowError;
use crate::models::Trade;
use crate::trading::BatchResult;

/// Decimal places for prices.
pub const PRICE_DP: u32 = 5;
/// Decimal places for money and percentages.
pub const MONEY_DP: u32 = 2;

const BLUE: &str = "\x1b[94m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[93m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Format with a fixed number of decimals, rounding half away from zero.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    format!("{:.*}", dp as usize, rounded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Cell {
    text: String,
    color: Option<&'static str>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn colored(text: impl Into<String>, color: &'static str) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// Renders trades as a boxed, optionally colored table.
pub struct TableRenderer {
    color: bool,
}

impl TableRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render all trades. `tp_count` is the number of take-profit tiers per trade.
    pub fn render(&self, trades: &[Trade], tp_count: usize) -> String {
        let headers = headers(tp_count);
        let rows: Vec<Vec<Cell>> = trades.iter().map(|t| row_cells(t, tp_count)).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let mut out = String::new();
        out.push_str(&border(&widths, '┌', '┬', '┐'));

        out.push('│');
        for (header, width) in headers.iter().zip(&widths) {
            let padded = format!(" {:<width$} ", header, width = *width);
            out.push_str(&self.paint(&padded, Some(BOLD)));
            out.push('│');
        }
        out.push('\n');
        out.push_str(&border(&widths, '├', '┼', '┤'));

        for row in &rows {
            out.push('│');
            for (idx, (cell, width)) in row.iter().zip(&widths).enumerate() {
                let padded = match alignment(idx) {
                    Align::Left => format!(" {:<width$} ", cell.text, width = *width),
                    Align::Right => format!(" {:>width$} ", cell.text, width = *width),
                };
                out.push_str(&self.paint(&padded, cell.color));
                out.push('│');
            }
            out.push('\n');
        }

        out.push_str(&border(&widths, '└', '┴', '┘'));
        out
    }

    /// Row failures, one per line.
    pub fn render_errors(&self, errors: &[RowError]) -> String {
        let mut out = String::new();
        for err in errors {
            out.push_str(&self.paint(&format!("error: {}", err), Some(RED)));
            out.push('\n');
        }
        out
    }

    /// One-line totals for the batch.
    pub fn render_summary(&self, batch: &BatchResult) -> String {
        let known = batch
            .trades
            .iter()
            .filter(|t| t.trade_value.is_some())
            .count();
        format!(
            "{} trades, {} failed rows, realized value {} over {} closed trades",
            batch.trades.len(),
            batch.errors.len(),
            batch
                .realized_total()
                .map_or_else(|| "overflow".to_string(), |v| fixed(v, MONEY_DP)),
            known
        )
    }

    fn paint(&self, text: &str, color: Option<&'static str>) -> String {
        match color {
            Some(code) if self.color => format!("{}{}{}", code, text, RESET),
            _ => text.to_string(),
        }
    }
}

fn headers(tp_count: usize) -> Vec<String> {
    let mut headers: Vec<String> = [
        "ID",
        "DateTime",
        "Pair",
        "Direction",
        "AccBalance",
        "Risk%",
        "Spread",
        "Entry",
        "Pivot",
        "EntryPrice",
        "SL",
        "LotSize",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    headers.extend((1..=tp_count).map(|k| format!("TP{}", k)));
    headers.extend((1..=tp_count).map(|k| format!("$TP{}", k)));
    headers.push("$SL".to_string());
    headers.push("$Value".to_string());
    headers
}

// ID, DateTime, Pair and Direction are text; everything after is numeric
fn alignment(column: usize) -> Align {
    if column < 4 {
        Align::Left
    } else {
        Align::Right
    }
}

fn row_cells(trade: &Trade, tp_count: usize) -> Vec<Cell> {
    let input = &trade.input;
    let mut cells = vec![
        Cell::plain(trade.short_id()),
        Cell::plain(trade.timestamp()),
        Cell::plain(input.pair.clone()),
        Cell::plain(trade.direction.as_str()),
        Cell::plain(fixed(input.account_balance, MONEY_DP)),
        Cell::plain(fixed(input.risk_percent, MONEY_DP)),
        Cell::plain(fixed(input.spread, MONEY_DP)),
        Cell::plain(fixed(input.entry, PRICE_DP)),
        Cell::plain(fixed(input.pivot, PRICE_DP)),
        Cell::colored(fixed(trade.entry_price, PRICE_DP), BLUE),
        Cell::colored(fixed(trade.stop_loss, PRICE_DP), RED),
        Cell::colored(fixed(trade.lot_size, MONEY_DP), YELLOW),
    ];

    for k in 0..tp_count {
        let text = trade
            .take_profits
            .get(k)
            .map(|tp| fixed(tp.price, PRICE_DP))
            .unwrap_or_default();
        cells.push(Cell::colored(text, GREEN));
    }
    for k in 0..tp_count {
        let text = trade
            .take_profits
            .get(k)
            .map(|tp| fixed(tp.profit, MONEY_DP))
            .unwrap_or_default();
        cells.push(Cell::plain(text));
    }

    cells.push(Cell::plain(fixed(-trade.risk_amount, MONEY_DP)));
    cells.push(Cell::plain(
        trade
            .trade_value
            .map(|v| fixed(v, MONEY_DP))
            .unwrap_or_else(|| "n/a".to_string()),
    ));
    cells
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(mid);
        }
        line.push_str(&"─".repeat(width + 2));
    }
    line.push(right);
    line.push('\n');
    line
}

/// One JSON object per trade, newline separated.
pub fn render_json(trades: &[Trade]) -> serde_json::Result<String> {
    let mut out = String::new();
    for trade in trades {
        out.push_str(&serde_json::to_string(trade)?);
        out.push('\n');
    }
    Ok(out)
}
