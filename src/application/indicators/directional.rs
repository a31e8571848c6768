//! Range and direction indicators built on the true range: ATR, ADX and SuperTrend.

use super::smoothing::WilderAverage;
use crate::domain::analysis::TrendDirection;
use crate::domain::market::Candle;

/// Average true range, Wilder smoothed. The first candle contributes `high - low`.
#[derive(Debug, Clone)]
pub struct Atr {
    prev_close: Option<f64>,
    avg: WilderAverage,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            prev_close: None,
            avg: WilderAverage::new(period),
        }
    }

    pub fn next(&mut self, candle: &Candle) -> f64 {
        let tr = candle.true_range(self.prev_close.replace(candle.close));
        self.avg.next(tr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

impl DirectionalOutput {
    pub const UNDEFINED: DirectionalOutput = DirectionalOutput {
        adx: f64::NAN,
        plus_di: f64::NAN,
        minus_di: f64::NAN,
    };
}

/// Average directional index with +DI / -DI.
///
/// TR and directional movement start at the second candle. DI values are
/// defined after `period` moves, ADX after `2 * period - 1`.
#[derive(Debug, Clone)]
pub struct Adx {
    prev: Option<Candle>,
    tr: WilderAverage,
    plus_dm: WilderAverage,
    minus_dm: WilderAverage,
    dx: WilderAverage,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self {
            prev: None,
            tr: WilderAverage::new(period),
            plus_dm: WilderAverage::new(period),
            minus_dm: WilderAverage::new(period),
            dx: WilderAverage::new(period),
        }
    }

    pub fn next(&mut self, candle: &Candle) -> DirectionalOutput {
        let Some(prev) = self.prev.replace(*candle) else {
            return DirectionalOutput::UNDEFINED;
        };

        let tr = candle.true_range(Some(prev.close));
        let up_move = candle.high - prev.high;
        let down_move = prev.low - candle.low;
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        let tr_smooth = self.tr.next(tr);
        let plus_smooth = self.plus_dm.next(plus_dm);
        let minus_smooth = self.minus_dm.next(minus_dm);
        if !self.tr.is_ready() {
            return DirectionalOutput::UNDEFINED;
        }

        let (plus_di, minus_di) = if tr_smooth > 0.0 {
            (100.0 * plus_smooth / tr_smooth, 100.0 * minus_smooth / tr_smooth)
        } else {
            (0.0, 0.0)
        };
        let sum_di = plus_di + minus_di;
        let dx = if sum_di > 0.0 {
            100.0 * (plus_di - minus_di).abs() / sum_di
        } else {
            0.0
        };

        DirectionalOutput {
            adx: self.dx.next(dx),
            plus_di,
            minus_di,
        }
    }
}

/// SuperTrend direction from ATR bands around the candle midpoint.
///
/// Final bands only tighten while price stays inside them; the direction
/// flips when the close crosses the band on the opposite side.
#[derive(Debug, Clone)]
pub struct SuperTrend {
    atr: Atr,
    multiplier: f64,
    prev_close: Option<f64>,
    final_upper: f64,
    final_lower: f64,
    direction: Option<TrendDirection>,
}

impl SuperTrend {
    pub fn new(atr_period: usize, multiplier: f64) -> Self {
        Self {
            atr: Atr::new(atr_period),
            multiplier,
            prev_close: None,
            final_upper: f64::NAN,
            final_lower: f64::NAN,
            direction: None,
        }
    }

    pub fn next(&mut self, candle: &Candle) -> Option<TrendDirection> {
        let atr = self.atr.next(candle);
        let prev_close = self.prev_close.replace(candle.close);
        if !atr.is_finite() {
            return None;
        }

        let mid = candle.hl2();
        let basic_upper = mid + self.multiplier * atr;
        let basic_lower = mid - self.multiplier * atr;

        let direction = match self.direction {
            None => {
                self.final_upper = basic_upper;
                self.final_lower = basic_lower;
                TrendDirection::Bull
            }
            Some(current) => {
                let pc = prev_close.unwrap_or(candle.close);
                if basic_upper < self.final_upper || pc > self.final_upper {
                    self.final_upper = basic_upper;
                }
                if basic_lower > self.final_lower || pc < self.final_lower {
                    self.final_lower = basic_lower;
                }
                match current {
                    TrendDirection::Bull if candle.close < self.final_lower => TrendDirection::Bear,
                    TrendDirection::Bear if candle.close > self.final_upper => TrendDirection::Bull,
                    unchanged => unchanged,
                }
            }
        };
        self.direction = Some(direction);
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Candle {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Candle::new(start + Duration::hours(i), close, high, low, close, 1.0)
    }

    #[test]
    fn test_atr_first_true_range_is_high_minus_low() {
        let mut atr = Atr::new(1);
        assert_eq!(atr.next(&candle(0, 12.0, 10.0, 11.0)), 2.0);
        // gap up: |H - Cprev| = 20 - 11
        assert_eq!(atr.next(&candle(1, 20.0, 19.0, 19.5)), 9.0);
    }

    #[test]
    fn test_atr_warmup() {
        let mut atr = Atr::new(14);
        let values: Vec<f64> = (0..14).map(|i| atr.next(&candle(i, 11.0, 9.0, 10.0))).collect();
        assert!(values[12].is_nan());
        assert_eq!(values[13], 2.0);
    }

    #[test]
    fn test_adx_flat_is_zero() {
        let mut adx = Adx::new(14);
        let outputs: Vec<DirectionalOutput> =
            (0..40).map(|i| adx.next(&candle(i, 100.0, 100.0, 100.0))).collect();
        assert!(outputs[26].adx.is_nan());
        assert_eq!(outputs[27].adx, 0.0);
        assert_eq!(outputs[39].plus_di, 0.0);
        assert_eq!(outputs[39].minus_di, 0.0);
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let mut adx = Adx::new(14);
        let last = (0..60)
            .map(|i| {
                let c = 100.0 + 2.0 * i as f64;
                adx.next(&candle(i, c + 1.0, c - 1.0, c))
            })
            .last()
            .unwrap();
        assert!(last.plus_di > last.minus_di);
        assert!(last.adx > 90.0 && last.adx <= 100.0 + 1e-9);
    }

    #[test]
    fn test_supertrend_flips_on_crash() {
        let mut st = SuperTrend::new(14, 3.0);
        let mut direction = None;
        for i in 0..30 {
            direction = st.next(&candle(i, 101.0, 99.0, 100.0));
        }
        assert_eq!(direction, Some(TrendDirection::Bull));
        for i in 30..35 {
            direction = st.next(&candle(i, 61.0, 59.0, 60.0));
        }
        assert_eq!(direction, Some(TrendDirection::Bear));
    }
}
