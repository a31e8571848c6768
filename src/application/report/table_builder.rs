use super::labels;
use crate::domain::analysis::IndicatorSnapshot;
use crate::domain::market::Timeframe;
use crate::domain::report::{Cell, INDICATOR_FAMILIES, ReportTable, SymbolReport, column_headers};

fn price_decimals(price: f64) -> usize {
    if price.abs() >= 1.0 { 2 } else { 6 }
}

/// Label text of one indicator family for one snapshot.
fn family_cell(family: &str, snap: Option<&IndicatorSnapshot>) -> Cell {
    let Some(s) = snap else {
        return Cell::text(format!("N/A {}", labels::WHITE));
    };
    let text = match family {
        "RSI" => labels::rsi(s.rsi),
        "Trend" => labels::trend(s.ema_short, s.ema_medium),
        "MACD Cross" => labels::macd_cross(s.macd, s.macd_signal, s.prev_macd, s.prev_macd_signal),
        "Bollinger Pos" => labels::bollinger(s.close, s.bb_lower, s.bb_upper),
        "Volume Sentiment" => labels::volume(s.volume, s.volume_mean),
        "Close vs EMA50" => labels::close_vs_ema(s.close, s.ema_medium),
        "ADX" => labels::adx(s.adx),
        "ATR" => labels::atr(s.atr, s.atr_mean),
        "MFI" => labels::mfi(s.mfi),
        "CCI" => labels::cci(s.cci),
        "OBV Δ" => labels::obv_delta(s.obv_delta),
        "SuperTrend" => labels::supertrend(s.supertrend),
        "Ichimoku" => labels::ichimoku(s.ichimoku.tenkan, s.ichimoku.kijun),
        "Donchian" => labels::donchian(s.close, s.donchian_high, s.donchian_low),
        "Pivot Zone" => labels::pivot_zone(s.close, &s.pivots),
        "MA200" => labels::ma200(s.close, s.sma_long),
        _ => format!("N/A {}", labels::WHITE),
    };
    Cell::Text(text)
}

/// One row per report, in the given order, under the fixed column schema.
pub fn build_table(reports: &[SymbolReport], timeframes: &[Timeframe]) -> ReportTable {
    let mut table = ReportTable::new(column_headers(timeframes));
    for report in reports {
        let mut row = vec![
            Cell::text(report.symbol.clone()),
            Cell::number(report.price, price_decimals(report.price)),
            Cell::number(report.score.value, 1),
            Cell::text(report.score.label.decorated()),
            Cell::text(report.consensus.decorated()),
        ];

        for family in INDICATOR_FAMILIES {
            for tf in timeframes {
                row.push(family_cell(family, report.snapshots.get(tf)));
            }
        }

        let senti = &report.sentiment;
        row.push(Cell::optional(senti.fear_greed_index, 1));
        row.push(Cell::text(
            senti
                .fear_greed_label
                .map(|c| format!("{} {}", c.emoji(), c))
                .unwrap_or_else(|| "❌".to_string()),
        ));
        row.push(Cell::optional(senti.social_score, 0));
        row.push(Cell::optional(senti.news_intensity, 3));
        row.push(Cell::optional(senti.score, 1));
        row.push(Cell::text(senti.mood().decorated()));
        row.push(Cell::text(
            report.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ));

        table.rows.push(row);
    }
    table
}
