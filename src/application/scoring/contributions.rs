//! Maps individual indicator readings to a bullishness contribution in [0, 1].
//!
//! Every rule returns 0.5 when its inputs are missing or not finite.

use crate::domain::analysis::IndicatorSnapshot;

pub const NEUTRAL: f64 = 0.5;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const TREND_FLAT_BAND: f64 = 0.005;
const TREND_STRONG_BAND: f64 = 0.02;

fn finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Oversold is bullish: 1.0 below 30, 0.0 above 70, linear in between.
pub fn rsi_contribution(rsi: f64) -> f64 {
    if !rsi.is_finite() {
        return NEUTRAL;
    }
    if rsi < RSI_OVERSOLD {
        1.0
    } else if rsi > RSI_OVERBOUGHT {
        0.0
    } else {
        (RSI_OVERBOUGHT - rsi) / (RSI_OVERBOUGHT - RSI_OVERSOLD)
    }
}

/// Relative spread between the short and medium EMA.
pub fn trend_contribution(ema_short: f64, ema_medium: f64) -> f64 {
    if !finite(&[ema_short, ema_medium]) || ema_medium == 0.0 {
        return NEUTRAL;
    }
    let spread = (ema_short - ema_medium) / ema_medium;
    if spread.abs() <= TREND_FLAT_BAND {
        0.5
    } else if spread > TREND_STRONG_BAND {
        1.0
    } else if spread > 0.0 {
        0.7
    } else if spread >= -TREND_STRONG_BAND {
        0.3
    } else {
        0.0
    }
}

/// MACD line above its signal is bullish; within `epsilon` counts as no cross.
pub fn macd_contribution(macd: f64, signal: f64, epsilon: f64) -> f64 {
    if !finite(&[macd, signal]) {
        return NEUTRAL;
    }
    let diff = macd - signal;
    if diff.abs() <= epsilon {
        0.5
    } else if diff > 0.0 {
        0.8
    } else {
        0.2
    }
}

/// Close below the lower band is a rebound candidate.
pub fn bollinger_contribution(close: f64, lower: f64, upper: f64) -> f64 {
    if !finite(&[close, lower, upper]) {
        return NEUTRAL;
    }
    if close < lower {
        1.0
    } else if close > upper {
        0.0
    } else {
        0.5
    }
}

/// Volume against its rolling mean.
pub fn volume_contribution(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r.is_finite() => {
            if r >= 1.3 {
                0.8
            } else if r >= 1.1 {
                0.65
            } else if r >= 0.9 {
                0.5
            } else if r > 0.7 {
                0.35
            } else {
                0.2
            }
        }
        _ => NEUTRAL,
    }
}

/// Sentiment on a 0-100 scale.
pub fn sentiment_contribution(sentiment: Option<f64>) -> f64 {
    match sentiment {
        Some(s) if s.is_finite() => s.clamp(0.0, 100.0) / 100.0,
        _ => NEUTRAL,
    }
}

/// All five indicator contributions for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contributions {
    pub rsi: f64,
    pub trend: f64,
    pub macd: f64,
    pub bollinger: f64,
    pub volume: f64,
}

impl Contributions {
    pub const NEUTRAL: Contributions = Contributions {
        rsi: NEUTRAL,
        trend: NEUTRAL,
        macd: NEUTRAL,
        bollinger: NEUTRAL,
        volume: NEUTRAL,
    };

    pub fn from_snapshot(snap: &IndicatorSnapshot, macd_epsilon: f64) -> Self {
        Self {
            rsi: rsi_contribution(snap.rsi),
            trend: trend_contribution(snap.ema_short, snap.ema_medium),
            macd: macd_contribution(snap.macd, snap.macd_signal, macd_epsilon),
            bollinger: bollinger_contribution(snap.close, snap.bb_lower, snap.bb_upper),
            volume: volume_contribution(snap.volume_ratio()),
        }
    }
}
