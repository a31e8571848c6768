//! Oscillators bounded to a fixed range: RSI, MFI, CCI and stochastic %K.

use super::smoothing::{RollingWindow, WilderAverage, Warmed};
use crate::domain::market::Candle;
use anyhow::{Result, anyhow};
use ta::indicators::{Maximum, Minimum};

/// Relative strength index with Wilder smoothing.
#[derive(Debug, Clone)]
pub struct Rsi {
    prev_close: Option<f64>,
    gains: WilderAverage,
    losses: WilderAverage,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            prev_close: None,
            gains: WilderAverage::new(period),
            losses: WilderAverage::new(period),
        }
    }

    pub fn next(&mut self, close: f64) -> f64 {
        let Some(prev) = self.prev_close.replace(close) else {
            return f64::NAN;
        };
        let change = close - prev;
        let avg_gain = self.gains.next(change.max(0.0));
        let avg_loss = self.losses.next((-change).max(0.0));
        if !self.gains.is_ready() {
            return f64::NAN;
        }
        rsi_from_averages(avg_gain, avg_loss)
    }
}

/// `100 - 100 / (1 + gain / loss)`, with 100 for a loss-free window and 50
/// when nothing moved at all.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        if avg_gain > 0.0 { 100.0 } else { 50.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Money flow index over typical-price changes.
#[derive(Debug, Clone)]
pub struct Mfi {
    prev_tp: Option<f64>,
    positive: RollingWindow,
    negative: RollingWindow,
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        Self {
            prev_tp: None,
            positive: RollingWindow::new(period),
            negative: RollingWindow::new(period),
        }
    }

    pub fn next(&mut self, candle: &Candle) -> f64 {
        let tp = candle.typical_price();
        let Some(prev) = self.prev_tp.replace(tp) else {
            return f64::NAN;
        };
        let flow = tp * candle.volume;
        let (pos, neg) = if tp > prev {
            (flow, 0.0)
        } else if tp < prev {
            (0.0, flow)
        } else {
            (0.0, 0.0)
        };
        self.positive.push(pos);
        self.negative.push(neg);
        if !self.positive.is_full() {
            return f64::NAN;
        }
        let pos_sum: f64 = self.positive.iter().sum();
        let neg_sum: f64 = self.negative.iter().sum();
        if neg_sum <= 0.0 {
            if pos_sum > 0.0 { 100.0 } else { 50.0 }
        } else {
            100.0 - 100.0 / (1.0 + pos_sum / neg_sum)
        }
    }
}

/// Commodity channel index using the mean absolute deviation of typical price.
#[derive(Debug, Clone)]
pub struct Cci {
    window: RollingWindow,
}

impl Cci {
    const SCALE: f64 = 0.015;

    pub fn new(period: usize) -> Self {
        Self {
            window: RollingWindow::new(period),
        }
    }

    pub fn next(&mut self, candle: &Candle) -> f64 {
        let tp = candle.typical_price();
        self.window.push(tp);
        if !self.window.is_full() {
            return f64::NAN;
        }
        let mean = self.window.mean();
        let count = self.window.iter().count() as f64;
        let mad = self.window.iter().map(|v| (v - mean).abs()).sum::<f64>() / count;
        if mad <= 0.0 {
            0.0
        } else {
            (tp - mean) / (Self::SCALE * mad)
        }
    }
}

/// Fast stochastic %K: where the close sits inside the recent high/low range.
#[derive(Debug, Clone)]
pub struct Stochastic {
    highest: Warmed<Maximum>,
    lowest: Warmed<Minimum>,
}

impl Stochastic {
    pub fn new(period: usize) -> Result<Self> {
        let highest = Maximum::new(period).map_err(|e| anyhow!("stochastic period {}: {:?}", period, e))?;
        let lowest = Minimum::new(period).map_err(|e| anyhow!("stochastic period {}: {:?}", period, e))?;
        Ok(Self {
            highest: Warmed::new(highest, period),
            lowest: Warmed::new(lowest, period),
        })
    }

    pub fn next(&mut self, candle: &Candle) -> f64 {
        let hh = self.highest.next(candle.high);
        let ll = self.lowest.next(candle.low);
        if !hh.is_finite() || !ll.is_finite() {
            return f64::NAN;
        }
        let range = hh - ll;
        if range <= 0.0 {
            50.0
        } else {
            (candle.close - ll) / range * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(start + Duration::hours(i as i64), *c, c + 1.0, c - 1.0, *c, 10.0))
            .collect()
    }

    #[test]
    fn test_rsi_warmup_and_flat_sentinel() {
        let mut rsi = Rsi::new(14);
        let values: Vec<f64> = (0..20).map(|_| rsi.next(100.0)).collect();
        assert!(values[..14].iter().all(|v| v.is_nan()));
        assert_eq!(values[14], 50.0);
        assert_eq!(values[19], 50.0);
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let mut up = Rsi::new(14);
        let last_up = (0..40).map(|i| up.next(100.0 + i as f64)).last().unwrap();
        assert_eq!(last_up, 100.0);

        let mut down = Rsi::new(14);
        let last_down = (0..40).map(|i| down.next(100.0 - i as f64)).last().unwrap();
        assert!(last_down < 1e-9);
    }

    #[test]
    fn test_rsi_known_value() {
        // Alternating +2 / -1 moves: avg gain 1.0, avg loss 0.5 over 14 changes.
        let mut rsi = Rsi::new(14);
        let mut price = 100.0;
        rsi.next(price);
        let mut last = f64::NAN;
        for i in 0..14 {
            price += if i % 2 == 0 { 2.0 } else { -1.0 };
            last = rsi.next(price);
        }
        assert!((last - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mfi_bounds_and_flat() {
        let mut mfi = Mfi::new(14);
        let flat: Vec<f64> = candles(&[50.0; 20]).iter().map(|c| mfi.next(c)).collect();
        assert!(flat[13].is_nan());
        assert_eq!(flat[14], 50.0);

        let mut mfi = Mfi::new(14);
        let rising: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let last = candles(&rising).iter().map(|c| mfi.next(c)).last().unwrap();
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_cci_zero_deviation() {
        let mut cci = Cci::new(20);
        let values: Vec<f64> = candles(&[10.0; 25]).iter().map(|c| cci.next(c)).collect();
        assert!(values[18].is_nan());
        assert_eq!(values[19], 0.0);
    }

    #[test]
    fn test_stochastic_range() {
        let mut stoch = Stochastic::new(14).unwrap();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let values: Vec<f64> = candles(&closes).iter().map(|c| stoch.next(c)).collect();
        assert!(values[12].is_nan());
        let last = values[19];
        assert!(last > 90.0 && last <= 100.0);

        let mut flat = Stochastic::new(3).unwrap();
        let c = Candle::new(Utc::now(), 1.0, 1.0, 1.0, 1.0, 1.0);
        flat.next(&c);
        flat.next(&c);
        assert_eq!(flat.next(&c), 50.0);
    }
}
