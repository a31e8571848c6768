//! Price levels: Ichimoku lines, Donchian channel, VWAP and floor pivots.

use super::smoothing::Warmed;
use crate::domain::analysis::{IchimokuLines, PivotLevels};
use crate::domain::market::Candle;
use anyhow::{Result, anyhow};
use ta::indicators::{Maximum, Minimum};

/// Highest high and lowest low over a fixed window.
#[derive(Debug, Clone)]
struct Channel {
    highest: Warmed<Maximum>,
    lowest: Warmed<Minimum>,
}

impl Channel {
    fn new(period: usize) -> Result<Self> {
        let highest = Maximum::new(period).map_err(|e| anyhow!("channel period {}: {:?}", period, e))?;
        let lowest = Minimum::new(period).map_err(|e| anyhow!("channel period {}: {:?}", period, e))?;
        Ok(Self {
            highest: Warmed::new(highest, period),
            lowest: Warmed::new(lowest, period),
        })
    }

    fn next(&mut self, candle: &Candle) -> (f64, f64) {
        (self.highest.next(candle.high), self.lowest.next(candle.low))
    }

    fn last(&self) -> (f64, f64) {
        (self.highest.last(), self.lowest.last())
    }

    /// Channel midpoint of the latest window.
    fn mid(&mut self, candle: &Candle) -> f64 {
        let (hh, ll) = self.next(candle);
        (hh + ll) / 2.0
    }
}

/// Ichimoku lines without the forward displacement of the cloud.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan: Channel,
    kijun: Channel,
    senkou_b: Channel,
}

impl Ichimoku {
    pub fn new(tenkan: usize, kijun: usize, senkou_b: usize) -> Result<Self> {
        Ok(Self {
            tenkan: Channel::new(tenkan)?,
            kijun: Channel::new(kijun)?,
            senkou_b: Channel::new(senkou_b)?,
        })
    }

    pub fn next(&mut self, candle: &Candle) -> IchimokuLines {
        let tenkan = self.tenkan.mid(candle);
        let kijun = self.kijun.mid(candle);
        IchimokuLines {
            tenkan,
            kijun,
            span_a: (tenkan + kijun) / 2.0,
            span_b: self.senkou_b.mid(candle),
        }
    }
}

/// Donchian channel of the candles before the current one, so a close can
/// break out of it.
#[derive(Debug, Clone)]
pub struct Donchian {
    channel: Channel,
}

impl Donchian {
    pub fn new(period: usize) -> Result<Self> {
        Ok(Self {
            channel: Channel::new(period)?,
        })
    }

    /// Returns (high, low) of the prior window, then absorbs `candle`.
    pub fn next(&mut self, candle: &Candle) -> (f64, f64) {
        let prior = self.channel.last();
        self.channel.next(candle);
        prior
    }
}

/// Volume-weighted average price accumulated from the first candle.
#[derive(Debug, Clone, Default)]
pub struct Vwap {
    price_volume: f64,
    volume: f64,
}

impl Vwap {
    pub fn next(&mut self, candle: &Candle) -> f64 {
        self.price_volume += candle.typical_price() * candle.volume;
        self.volume += candle.volume;
        if self.volume > 0.0 {
            self.price_volume / self.volume
        } else {
            candle.close
        }
    }
}

/// Pivots for `candles[index]`, taken from the prior completed UTC day.
///
/// The day is rebuilt from the candles themselves: high and low over every
/// candle of the latest earlier date, close of its last candle. On a daily
/// series that is simply the previous candle.
pub fn prior_pivots(candles: &[Candle], index: usize) -> PivotLevels {
    let Some(current) = candles.get(index) else {
        return PivotLevels::UNDEFINED;
    };
    let today = current.timestamp.date_naive();

    let mut earlier = candles[..index]
        .iter()
        .rev()
        .skip_while(|c| c.timestamp.date_naive() >= today);
    let Some(last) = earlier.next() else {
        return PivotLevels::UNDEFINED;
    };
    let day = last.timestamp.date_naive();

    let (high, low) = earlier
        .take_while(|c| c.timestamp.date_naive() == day)
        .fold((last.high, last.low), |(h, l), c| (h.max(c.high), l.min(c.low)));
    PivotLevels::from_hlc(high, low, last.close)
}
