use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One time-boxed OHLCV summary of trading activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// True range against the previous close. Without a previous close this is high - low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let range = self.high - self.low;
        match prev_close {
            Some(pc) => range
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => range,
        }
    }
}

// Lets `ta` indicators consume candles directly (OBV, Maximum, Minimum).
impl ta::Open for Candle {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for Candle {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for Candle {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for Candle {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for Candle {
    fn volume(&self) -> f64 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(
            Utc.timestamp_opt(1_704_067_200, 0).unwrap(),
            open,
            high,
            low,
            close,
            10.0,
        )
    }

    #[test]
    fn test_true_range_uses_previous_close_gap() {
        let c = candle(100.0, 102.0, 99.0, 101.0);
        assert_eq!(c.true_range(None), 3.0);
        // Gap up: |high - prev_close| dominates
        assert_eq!(c.true_range(Some(95.0)), 7.0);
        // Gap down: |low - prev_close| dominates
        assert_eq!(c.true_range(Some(105.0)), 6.0);
    }

    #[test]
    fn test_typical_price() {
        let c = candle(100.0, 103.0, 97.0, 100.0);
        assert!((c.typical_price() - 100.0).abs() < 1e-12);
        assert_eq!(c.hl2(), 100.0);
    }
}
