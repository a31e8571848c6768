use super::candle::Candle;
use super::timeframe::Timeframe;

/// Ordered candles (oldest first) for one symbol at one granularity.
///
/// Timestamps are strictly increasing. Gaps are allowed: venues skip periods
/// without trades.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: String,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl Series {
    /// Builds a series from candles in any order.
    ///
    /// Candles are sorted by timestamp; when a timestamp repeats, the last
    /// occurrence in the input wins.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, mut candles: Vec<Candle>) -> Self {
        // Stable sort keeps input order among equal timestamps.
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        Self {
            symbol: symbol.into(),
            timeframe,
            candles: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Number of periods missing between consecutive candles.
    pub fn gap_count(&self) -> usize {
        let step = self.timeframe.to_seconds();
        self.candles
            .windows(2)
            .map(|w| {
                let delta = (w[1].timestamp - w[0].timestamp).num_seconds();
                if delta > step {
                    ((delta / step) - 1) as usize
                } else {
                    0
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle_at(hour: i64, close: f64) -> Candle {
        Candle::new(
            Utc.timestamp_opt(1_704_067_200 + hour * 3600, 0).unwrap(),
            close,
            close,
            close,
            close,
            1.0,
        )
    }

    #[test]
    fn test_sorts_newest_first_input() {
        let series = Series::new(
            "BTC-USD",
            Timeframe::OneHour,
            vec![candle_at(2, 3.0), candle_at(1, 2.0), candle_at(0, 1.0)],
        );
        let closes: Vec<f64> = series.candles().iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last().map(|c| c.close), Some(3.0));
    }

    #[test]
    fn test_duplicate_timestamps_keep_latest() {
        let series = Series::new(
            "BTC-USD",
            Timeframe::OneHour,
            vec![candle_at(0, 1.0), candle_at(1, 2.0), candle_at(1, 2.5)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().map(|c| c.close), Some(2.5));
    }

    #[test]
    fn test_gap_count() {
        let series = Series::new(
            "ETH-USD",
            Timeframe::OneHour,
            vec![candle_at(0, 1.0), candle_at(1, 1.0), candle_at(4, 1.0)],
        );
        assert_eq!(series.gap_count(), 2);
    }

    #[test]
    fn test_empty_series() {
        let series = Series::new("ETH-USD", Timeframe::OneDay, vec![]);
        assert!(series.is_empty());
        assert!(series.last().is_none());
        assert_eq!(series.gap_count(), 0);
    }
}
