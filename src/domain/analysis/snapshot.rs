use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a two-state trend classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bull,
    Bear,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Bull => write!(f, "Bull"),
            TrendDirection::Bear => write!(f, "Bear"),
        }
    }
}

/// Classic floor pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,
}

impl PivotLevels {
    pub const UNDEFINED: PivotLevels = PivotLevels {
        pivot: f64::NAN,
        r1: f64::NAN,
        s1: f64::NAN,
    };

    /// pivot = (H + L + C) / 3, R1 = 2P - L, S1 = 2P - H
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        Self {
            pivot,
            r1: 2.0 * pivot - low,
            s1: 2.0 * pivot - high,
        }
    }
}

/// Ichimoku lines computed without forward displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IchimokuLines {
    pub tenkan: f64,
    pub kijun: f64,
    pub span_a: f64,
    pub span_b: f64,
}

impl IchimokuLines {
    pub const UNDEFINED: IchimokuLines = IchimokuLines {
        tenkan: f64::NAN,
        kijun: f64::NAN,
        span_a: f64::NAN,
        span_b: f64::NAN,
    };
}

/// Indicator values derived for a single candle of a series.
///
/// Numeric fields are NaN while the indicator is still inside its lookback
/// window or when the indicator is disabled. Consumers must check with
/// [`f64::is_finite`] before comparing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
    pub volume_mean: f64,

    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub prev_macd: f64,
    pub prev_macd_signal: f64,

    pub ema_short: f64,
    pub ema_medium: f64,
    pub sma_long: f64,

    pub bb_mid: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,

    pub atr: f64,
    pub atr_mean: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,

    pub obv: f64,
    pub obv_delta: f64,
    pub mfi: f64,
    pub cci: f64,
    pub stochastic_k: f64,
    pub vwap: f64,

    pub ichimoku: IchimokuLines,
    pub donchian_high: f64,
    pub donchian_low: f64,
    pub pivots: PivotLevels,

    pub supertrend: Option<TrendDirection>,
    pub trend: Option<TrendDirection>,
}

impl IndicatorSnapshot {
    /// A snapshot where every derived value is undefined.
    pub fn empty(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
            volume_mean: f64::NAN,
            rsi: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            macd_histogram: f64::NAN,
            prev_macd: f64::NAN,
            prev_macd_signal: f64::NAN,
            ema_short: f64::NAN,
            ema_medium: f64::NAN,
            sma_long: f64::NAN,
            bb_mid: f64::NAN,
            bb_upper: f64::NAN,
            bb_lower: f64::NAN,
            atr: f64::NAN,
            atr_mean: f64::NAN,
            adx: f64::NAN,
            plus_di: f64::NAN,
            minus_di: f64::NAN,
            obv: f64::NAN,
            obv_delta: f64::NAN,
            mfi: f64::NAN,
            cci: f64::NAN,
            stochastic_k: f64::NAN,
            vwap: f64::NAN,
            ichimoku: IchimokuLines::UNDEFINED,
            donchian_high: f64::NAN,
            donchian_low: f64::NAN,
            pivots: PivotLevels::UNDEFINED,
            supertrend: None,
            trend: None,
        }
    }

    /// Every numeric field, labelled. Used by completeness checks and debug output.
    pub fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("close", self.close),
            ("volume", self.volume),
            ("volume_mean", self.volume_mean),
            ("rsi", self.rsi),
            ("macd", self.macd),
            ("macd_signal", self.macd_signal),
            ("macd_histogram", self.macd_histogram),
            ("prev_macd", self.prev_macd),
            ("prev_macd_signal", self.prev_macd_signal),
            ("ema_short", self.ema_short),
            ("ema_medium", self.ema_medium),
            ("sma_long", self.sma_long),
            ("bb_mid", self.bb_mid),
            ("bb_upper", self.bb_upper),
            ("bb_lower", self.bb_lower),
            ("atr", self.atr),
            ("atr_mean", self.atr_mean),
            ("adx", self.adx),
            ("plus_di", self.plus_di),
            ("minus_di", self.minus_di),
            ("obv", self.obv),
            ("obv_delta", self.obv_delta),
            ("mfi", self.mfi),
            ("cci", self.cci),
            ("stochastic_k", self.stochastic_k),
            ("vwap", self.vwap),
            ("ichimoku_tenkan", self.ichimoku.tenkan),
            ("ichimoku_kijun", self.ichimoku.kijun),
            ("ichimoku_span_a", self.ichimoku.span_a),
            ("ichimoku_span_b", self.ichimoku.span_b),
            ("donchian_high", self.donchian_high),
            ("donchian_low", self.donchian_low),
            ("pivot", self.pivots.pivot),
            ("pivot_r1", self.pivots.r1),
            ("pivot_s1", self.pivots.s1),
        ]
    }

    /// Names of the numeric fields that are still NaN or infinite.
    pub fn undefined_fields(&self) -> Vec<&'static str> {
        self.numeric_fields()
            .into_iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.undefined_fields().is_empty() && self.trend.is_some() && self.supertrend.is_some()
    }

    /// Current volume relative to its rolling mean; `None` when undefined.
    pub fn volume_ratio(&self) -> Option<f64> {
        if self.volume.is_finite() && self.volume_mean.is_finite() && self.volume_mean > 0.0 {
            Some(self.volume / self.volume_mean)
        } else {
            None
        }
    }
}
