//! Building blocks shared by the indicator implementations.

use std::collections::VecDeque;
use ta::Next;

/// Wilder's smoothed moving average.
///
/// Seeded with the simple mean of the first `period` inputs, then
/// `avg = (avg * (n - 1) + x) / n`. Returns NaN until seeded.
#[derive(Debug, Clone)]
pub struct WilderAverage {
    period: usize,
    seed_sum: f64,
    count: usize,
    value: f64,
}

impl WilderAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            seed_sum: 0.0,
            count: 0,
            value: f64::NAN,
        }
    }

    pub fn next(&mut self, x: f64) -> f64 {
        let n = self.period as f64;
        self.count += 1;
        if self.count < self.period {
            self.seed_sum += x;
        } else if self.count == self.period {
            self.value = (self.seed_sum + x) / n;
        } else {
            self.value = (self.value * (n - 1.0) + x) / n;
        }
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }
}

/// Masks a `ta` indicator as NaN until it has consumed `period` inputs.
///
/// `ta` indicators emit values from the first input on (an SMA of one value,
/// a maximum of one high). Non-finite inputs are skipped and yield NaN.
#[derive(Debug, Clone)]
pub struct Warmed<I> {
    inner: I,
    period: usize,
    seen: usize,
    last: f64,
}

impl<I> Warmed<I>
where
    I: Next<f64, Output = f64>,
{
    pub fn new(inner: I, period: usize) -> Self {
        Self {
            inner,
            period,
            seen: 0,
            last: f64::NAN,
        }
    }

    pub fn next(&mut self, x: f64) -> f64 {
        if !x.is_finite() {
            return f64::NAN;
        }
        self.seen += 1;
        let value = self.inner.next(x);
        self.last = if self.seen >= self.period {
            value
        } else {
            f64::NAN
        };
        self.last
    }

    /// Output of the most recent accepted input.
    pub fn last(&self) -> f64 {
        self.last
    }
}

/// Fixed-capacity window over the latest values.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, x: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(x);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ta::indicators::SimpleMovingAverage;

    #[test]
    fn test_wilder_seeds_with_simple_mean() {
        let mut w = WilderAverage::new(3);
        assert!(w.next(1.0).is_nan());
        assert!(w.next(2.0).is_nan());
        assert_eq!(w.next(3.0), 2.0);
        assert!(w.is_ready());
        // (2 * 2 + 5) / 3
        assert_eq!(w.next(5.0), 3.0);
    }

    #[test]
    fn test_warmed_masks_until_period() {
        let mut sma = Warmed::new(SimpleMovingAverage::new(3).unwrap(), 3);
        assert!(sma.next(1.0).is_nan());
        assert!(sma.next(f64::NAN).is_nan());
        assert!(sma.next(2.0).is_nan());
        assert_eq!(sma.next(3.0), 2.0);
        assert_eq!(sma.last(), 2.0);
    }

    #[test]
    fn test_rolling_window_evicts_oldest() {
        let mut w = RollingWindow::new(2);
        w.push(1.0);
        assert!(!w.is_full());
        w.push(3.0);
        w.push(5.0);
        assert!(w.is_full());
        assert_eq!(w.mean(), 4.0);
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![3.0, 5.0]);
    }
}
