//! Human-readable cell text for each indicator family.
//!
//! Every label ends in, or carries, one dot of the five-colour palette:
//! 🟢 bullish, 🔵 mildly bullish, ⚪ neutral, 🟠 mildly bearish, 🔴 bearish.
//! Undefined inputs render as "N/A ⚪".

use crate::domain::analysis::{PivotLevels, TrendDirection};

pub const GREEN: &str = "🟢";
pub const BLUE: &str = "🔵";
pub const WHITE: &str = "⚪";
pub const ORANGE: &str = "🟠";
pub const RED: &str = "🔴";

const MACD_EPSILON: f64 = 1e-6;

fn na() -> String {
    format!("N/A {}", WHITE)
}

fn defined(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// (a - b) / b, NaN when b is zero.
fn spread(a: f64, b: f64) -> f64 {
    if b == 0.0 { f64::NAN } else { (a - b) / b }
}

fn spread_dot(s: f64) -> &'static str {
    if s.abs() <= 0.005 {
        WHITE
    } else if s > 0.02 {
        GREEN
    } else if s > 0.0 {
        BLUE
    } else if s > -0.02 {
        ORANGE
    } else {
        RED
    }
}

pub fn rsi(v: f64) -> String {
    if !v.is_finite() {
        return na();
    }
    let (dot, text) = if v < 30.0 {
        (GREEN, "Buy")
    } else if v < 45.0 {
        (BLUE, "Mild rebound")
    } else if v <= 55.0 {
        (WHITE, "Neutral")
    } else if v <= 70.0 {
        (ORANGE, "Moderately overbought")
    } else {
        (RED, "Sell")
    };
    format!("{:.1} {} {}", v, dot, text)
}

/// Bullish/bearish cross; the dot is stronger when the gap is widening
/// compared to the previous candle.
pub fn macd_cross(macd: f64, signal: f64, prev_macd: f64, prev_signal: f64) -> String {
    if !defined(&[macd, signal]) {
        return format!("❌ None {}", WHITE);
    }
    let widening = if defined(&[prev_macd, prev_signal]) {
        Some((macd - prev_macd) > (signal - prev_signal))
    } else {
        None
    };
    if (macd - signal).abs() <= MACD_EPSILON {
        return format!("❌ None {}", WHITE);
    }
    if macd > signal {
        let dot = if widening == Some(true) { GREEN } else { BLUE };
        format!("📈 Bullish {}", dot)
    } else {
        let dot = if widening == Some(false) { RED } else { ORANGE };
        format!("📉 Bearish {}", dot)
    }
}

pub fn trend(ema_short: f64, ema_medium: f64) -> String {
    let s = spread(ema_short, ema_medium);
    if !s.is_finite() {
        return na();
    }
    let dot = spread_dot(s);
    let word = match dot {
        GREEN | BLUE => "Bull",
        ORANGE | RED => "Bear",
        _ => "Neutral",
    };
    format!("{} {}", word, dot)
}

pub fn bollinger(close: f64, lower: f64, upper: f64) -> String {
    if !defined(&[close, lower, upper]) {
        return na();
    }
    if close < lower {
        format!("⬇️ Oversold {}", GREEN)
    } else if close > upper {
        format!("⬆️ Overbought {}", RED)
    } else if close <= lower * 1.02 && lower < upper {
        format!("⬇️ Near low {}", BLUE)
    } else if close >= upper * 0.98 && lower < upper {
        format!("⬆️ Near high {}", ORANGE)
    } else {
        format!("〰️ Neutral {}", WHITE)
    }
}

pub fn volume(volume: f64, volume_mean: f64) -> String {
    if !defined(&[volume, volume_mean]) || volume_mean <= 0.0 {
        return na();
    }
    let ratio = volume / volume_mean;
    if ratio >= 1.3 {
        format!("⬆️ Bullish {}", GREEN)
    } else if ratio >= 1.1 {
        format!("⬆️ Slight {}", BLUE)
    } else if ratio >= 0.9 {
        format!("〰️ Normal {}", WHITE)
    } else if ratio > 0.7 {
        format!("⬇️ Slight {}", ORANGE)
    } else {
        format!("⬇️ Weak {}", RED)
    }
}

pub fn close_vs_ema(close: f64, ema: f64) -> String {
    let s = spread(close, ema);
    if !close.is_finite() || !s.is_finite() {
        return na();
    }
    format!("{:.1} {}", close, spread_dot(s))
}

pub fn adx(v: f64) -> String {
    if !v.is_finite() {
        return na();
    }
    let (dot, text) = if v > 40.0 {
        (RED, "Strong (late cycle?)")
    } else if v >= 25.0 {
        (GREEN, "Solid")
    } else if v >= 20.0 {
        (BLUE, "Emerging trend")
    } else if v >= 15.0 {
        (WHITE, "Weak")
    } else {
        (ORANGE, "Directionless")
    };
    format!("{:.1} {} {}", v, dot, text)
}

pub fn atr(v: f64, mean: f64) -> String {
    if !v.is_finite() {
        return na();
    }
    if !mean.is_finite() {
        return format!("{:.2} {}", v, WHITE);
    }
    let (dot, text) = if v >= mean * 2.0 && mean > 0.0 {
        (RED, "Excessive volatility")
    } else if v > mean * 1.1 {
        (ORANGE, "High volatility")
    } else if (v - mean).abs() / mean.max(1e-9) <= 0.1 {
        (WHITE, "Normal")
    } else {
        (GREEN, "Compression")
    };
    format!("{:.2} {} {}", v, dot, text)
}

pub fn mfi(v: f64) -> String {
    if !v.is_finite() {
        return na();
    }
    let (dot, text) = if v < 20.0 {
        (GREEN, "Oversold")
    } else if v < 40.0 {
        (BLUE, "Rebound")
    } else if v <= 60.0 {
        (WHITE, "Neutral")
    } else if v <= 80.0 {
        (ORANGE, "Mod. overbought")
    } else {
        (RED, "Overbought")
    };
    format!("{:.1} {} {}", v, dot, text)
}

pub fn cci(v: f64) -> String {
    if !v.is_finite() {
        return na();
    }
    let (dot, text) = if v < -100.0 {
        (GREEN, "Oversold")
    } else if v < 0.0 {
        (BLUE, "Rebound")
    } else if v <= 100.0 {
        (WHITE, "Neutral")
    } else if v <= 200.0 {
        (ORANGE, "Mod. overbought")
    } else {
        (RED, "Overbought")
    };
    format!("{:.0} {} {}", v, dot, text)
}

pub fn obv_delta(delta: f64) -> String {
    if !delta.is_finite() {
        return na();
    }
    if delta > 0.0 {
        format!("{:.0} {} Buying", delta, GREEN)
    } else if delta == 0.0 {
        format!("{:.0} {} Stable", delta, WHITE)
    } else {
        format!("{:.0} {} Selling", delta, RED)
    }
}

pub fn supertrend(direction: Option<TrendDirection>) -> String {
    match direction {
        Some(TrendDirection::Bull) => format!("Bull {}", GREEN),
        Some(TrendDirection::Bear) => format!("Bear {}", RED),
        None => na(),
    }
}

pub fn ichimoku(tenkan: f64, kijun: f64) -> String {
    if !defined(&[tenkan, kijun]) {
        return na();
    }
    if (tenkan - kijun).abs() / kijun.abs().max(1e-9) <= 0.005 {
        format!("≈ {}", WHITE)
    } else if tenkan > kijun {
        format!("Tenkan>Kijun {}", GREEN)
    } else {
        format!("Tenkan<Kijun {}", RED)
    }
}

pub fn donchian(close: f64, high: f64, low: f64) -> String {
    if !defined(&[close, high, low]) {
        return na();
    }
    if close > high {
        format!("Breakout high {}", GREEN)
    } else if close < low {
        format!("Breakdown low {}", RED)
    } else {
        format!("Range {}", WHITE)
    }
}

pub fn pivot_zone(close: f64, pivots: &PivotLevels) -> String {
    if !defined(&[close, pivots.r1, pivots.s1]) {
        return na();
    }
    if close > pivots.r1 {
        format!(">{:.1} {} Overbought", pivots.r1, RED)
    } else if close < pivots.s1 {
        format!("<{:.1} {} Oversold", pivots.s1, GREEN)
    } else {
        format!("In range {}", WHITE)
    }
}

pub fn ma200(close: f64, ma: f64) -> String {
    if !defined(&[close, ma]) {
        return na();
    }
    if (close - ma).abs() / ma.max(1e-9) <= 0.005 {
        format!("{:.1} {} ≈MA200", close, WHITE)
    } else if close > ma {
        format!("{:.1} {} LT+", close, GREEN)
    } else {
        format!("{:.1} {} LT-", close, RED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_labels() {
        assert_eq!(rsi(25.0), "25.0 🟢 Buy");
        assert_eq!(rsi(50.0), "50.0 ⚪ Neutral");
        assert_eq!(rsi(80.0), "80.0 🔴 Sell");
        assert_eq!(rsi(f64::NAN), "N/A ⚪");
    }

    #[test]
    fn test_macd_cross_strength() {
        assert_eq!(macd_cross(2.0, 1.0, 1.0, 1.0), "📈 Bullish 🟢");
        assert_eq!(macd_cross(2.0, 1.0, f64::NAN, f64::NAN), "📈 Bullish 🔵");
        assert_eq!(macd_cross(1.0, 2.0, 1.5, 1.5), "📉 Bearish 🔴");
        assert_eq!(macd_cross(1.0, 1.0, 0.0, 0.0), "❌ None ⚪");
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(trend(103.0, 100.0), "Bull 🟢");
        assert_eq!(trend(101.0, 100.0), "Bull 🔵");
        assert_eq!(trend(100.2, 100.0), "Neutral ⚪");
        assert_eq!(trend(99.0, 100.0), "Bear 🟠");
        assert_eq!(trend(90.0, 100.0), "Bear 🔴");
        assert_eq!(trend(1.0, 0.0), "N/A ⚪");
    }

    #[test]
    fn test_bollinger_labels() {
        assert_eq!(bollinger(89.0, 90.0, 110.0), "⬇️ Oversold 🟢");
        assert_eq!(bollinger(91.0, 90.0, 110.0), "⬇️ Near low 🔵");
        assert_eq!(bollinger(100.0, 90.0, 110.0), "〰️ Neutral ⚪");
        assert_eq!(bollinger(109.0, 90.0, 110.0), "⬆️ Near high 🟠");
        assert_eq!(bollinger(111.0, 90.0, 110.0), "⬆️ Overbought 🔴");
        assert_eq!(bollinger(100.0, 100.0, 100.0), "〰️ Neutral ⚪");
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(donchian(120.0, 110.0, 90.0), "Breakout high 🟢");
        assert_eq!(
            pivot_zone(120.0, &PivotLevels::from_hlc(110.0, 90.0, 100.0)),
            ">110.0 🔴 Overbought"
        );
        assert_eq!(ma200(100.1, 100.0), "100.1 ⚪ ≈MA200");
        assert_eq!(supertrend(Some(TrendDirection::Bear)), "Bear 🔴");
        assert_eq!(obv_delta(-250.0), "-250 🔴 Selling");
        assert_eq!(atr(1.0, f64::NAN), "1.00 ⚪");
        assert_eq!(atr(1.0, 1.0), "1.00 ⚪ Normal");
        assert_eq!(atr(3.0, 1.0), "3.00 🔴 Excessive volatility");
    }
}
