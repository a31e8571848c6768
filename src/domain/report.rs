use crate::domain::analysis::{IndicatorSnapshot, Score, SignalLabel};
use crate::domain::market::Timeframe;
use crate::domain::sentiment::SymbolSentiment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns before the per-timeframe block.
pub const LEADING_COLUMNS: [&str; 5] = [
    "Crypto",
    "Price",
    "Global Score (0-10)",
    "Signal",
    "Consensus",
];

/// Indicator families; each gets one column per configured timeframe.
pub const INDICATOR_FAMILIES: [&str; 16] = [
    "RSI",
    "Trend",
    "MACD Cross",
    "Bollinger Pos",
    "Volume Sentiment",
    "Close vs EMA50",
    "ADX",
    "ATR",
    "MFI",
    "CCI",
    "OBV Δ",
    "SuperTrend",
    "Ichimoku",
    "Donchian",
    "Pivot Zone",
    "MA200",
];

/// Columns after the per-timeframe block.
pub const TRAILING_COLUMNS: [&str; 7] = [
    "Fear & Greed Index",
    "Fear & Greed Label",
    "Social Sentiment",
    "News Intensity",
    "Sentiment Score",
    "Sentiment Global",
    "Last Update",
];

/// Full header row for the given timeframes, e.g. "RSI 1H".
pub fn column_headers(timeframes: &[Timeframe]) -> Vec<String> {
    let mut headers: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for family in INDICATOR_FAMILIES {
        for tf in timeframes {
            headers.push(format!("{} {}", family, tf.column_label()));
        }
    }
    headers.extend(TRAILING_COLUMNS.iter().map(|c| c.to_string()));
    headers
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number { value: f64, decimals: usize },
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// A number, or an empty cell when it is not finite.
    pub fn number(value: f64, decimals: usize) -> Self {
        if value.is_finite() {
            Cell::Number { value, decimals }
        } else {
            Cell::Empty
        }
    }

    pub fn optional(value: Option<f64>, decimals: usize) -> Self {
        value.map_or(Cell::Empty, |v| Cell::number(v, decimals))
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number { value, decimals } => format!("{:.*}", decimals, value),
            Cell::Empty => String::new(),
        }
    }
}

/// Header plus rows, written as one batch per cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of `column` in the row whose first cell is `symbol`.
    pub fn cell(&self, symbol: &str, column: &str) -> Option<&Cell> {
        let idx = self.column(column)?;
        self.rows
            .iter()
            .find(|row| matches!(row.first(), Some(Cell::Text(s)) if s == symbol))
            .and_then(|row| row.get(idx))
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(Cell::Text(s)) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    /// Header followed by rendered rows.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.headers.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(Cell::render).collect()),
            )
            .collect()
    }
}

/// Everything computed for one symbol during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub price: f64,
    pub score: Score,
    pub consensus: SignalLabel,
    pub snapshots: BTreeMap<Timeframe, IndicatorSnapshot>,
    pub sentiment: SymbolSentiment,
    pub updated_at: DateTime<Utc>,
}
