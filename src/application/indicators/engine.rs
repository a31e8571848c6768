use super::directional::{Adx, Atr, SuperTrend};
use super::levels::{Donchian, Ichimoku, Vwap, prior_pivots};
use super::momentum::{Cci, Mfi, Rsi, Stochastic};
use super::smoothing::Warmed;
use crate::domain::analysis::{IchimokuLines, IndicatorSnapshot, PivotLevels, TrendDirection};
use crate::domain::market::{Candle, Series};
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use ta::Next;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    OnBalanceVolume, SimpleMovingAverage,
};

/// Lookback windows of every indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ema_short: usize,
    pub ema_medium: usize,
    pub sma_long: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
    pub atr_mean_period: usize,
    pub adx_period: usize,
    pub mfi_period: usize,
    pub cci_period: usize,
    pub stochastic_period: usize,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub ichimoku_tenkan: usize,
    pub ichimoku_kijun: usize,
    pub ichimoku_senkou_b: usize,
    pub donchian_period: usize,
    pub volume_mean_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ema_short: 20,
            ema_medium: 50,
            sma_long: 200,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
            atr_mean_period: 20,
            adx_period: 14,
            mfi_period: 14,
            cci_period: 20,
            stochastic_period: 14,
            supertrend_period: 14,
            supertrend_multiplier: 3.0,
            ichimoku_tenkan: 9,
            ichimoku_kijun: 26,
            ichimoku_senkou_b: 52,
            donchian_period: 20,
            volume_mean_period: 20,
        }
    }
}

impl IndicatorParams {
    /// Number of candles after which every indicator of the last candle is defined.
    pub fn longest_lookback(&self) -> usize {
        [
            self.rsi_period + 1,
            self.macd_slow + self.macd_signal - 1,
            self.ema_short,
            self.ema_medium,
            self.sma_long,
            self.bb_period,
            self.atr_period + self.atr_mean_period - 1,
            2 * self.adx_period,
            self.mfi_period + 1,
            self.cci_period,
            self.stochastic_period,
            self.supertrend_period,
            self.ichimoku_tenkan,
            self.ichimoku_kijun,
            self.ichimoku_senkou_b,
            self.donchian_period + 1,
            self.volume_mean_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("ema_short", self.ema_short),
            ("ema_medium", self.ema_medium),
            ("sma_long", self.sma_long),
            ("bb_period", self.bb_period),
            ("atr_period", self.atr_period),
            ("atr_mean_period", self.atr_mean_period),
            ("adx_period", self.adx_period),
            ("mfi_period", self.mfi_period),
            ("cci_period", self.cci_period),
            ("stochastic_period", self.stochastic_period),
            ("supertrend_period", self.supertrend_period),
            ("ichimoku_tenkan", self.ichimoku_tenkan),
            ("ichimoku_kijun", self.ichimoku_kijun),
            ("ichimoku_senkou_b", self.ichimoku_senkou_b),
            ("donchian_period", self.donchian_period),
            ("volume_mean_period", self.volume_mean_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            bail!("Indicator period {} must be > 0", name);
        }
        if self.macd_fast >= self.macd_slow {
            bail!(
                "MACD fast period ({}) must be shorter than slow period ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        if !(self.bb_std_dev.is_finite() && self.bb_std_dev > 0.0) {
            bail!("Bollinger std-dev multiplier must be > 0, got {}", self.bb_std_dev);
        }
        if !(self.supertrend_multiplier.is_finite() && self.supertrend_multiplier > 0.0) {
            bail!(
                "SuperTrend multiplier must be > 0, got {}",
                self.supertrend_multiplier
            );
        }
        Ok(())
    }
}

/// Indicator families that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    MovingAverages,
    Bollinger,
    Atr,
    Adx,
    Obv,
    Mfi,
    Cci,
    Stochastic,
    Vwap,
    Ichimoku,
    Donchian,
    Pivots,
    SuperTrend,
    Volume,
}

impl IndicatorKind {
    pub fn all() -> [IndicatorKind; 16] {
        [
            IndicatorKind::Rsi,
            IndicatorKind::Macd,
            IndicatorKind::MovingAverages,
            IndicatorKind::Bollinger,
            IndicatorKind::Atr,
            IndicatorKind::Adx,
            IndicatorKind::Obv,
            IndicatorKind::Mfi,
            IndicatorKind::Cci,
            IndicatorKind::Stochastic,
            IndicatorKind::Vwap,
            IndicatorKind::Ichimoku,
            IndicatorKind::Donchian,
            IndicatorKind::Pivots,
            IndicatorKind::SuperTrend,
            IndicatorKind::Volume,
        ]
    }
}

impl FromStr for IndicatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Ok(IndicatorKind::Rsi),
            "macd" => Ok(IndicatorKind::Macd),
            "ema" | "sma" | "ma" | "moving_averages" => Ok(IndicatorKind::MovingAverages),
            "bollinger" | "bb" => Ok(IndicatorKind::Bollinger),
            "atr" => Ok(IndicatorKind::Atr),
            "adx" => Ok(IndicatorKind::Adx),
            "obv" => Ok(IndicatorKind::Obv),
            "mfi" => Ok(IndicatorKind::Mfi),
            "cci" => Ok(IndicatorKind::Cci),
            "stochastic" | "stoch" => Ok(IndicatorKind::Stochastic),
            "vwap" => Ok(IndicatorKind::Vwap),
            "ichimoku" => Ok(IndicatorKind::Ichimoku),
            "donchian" => Ok(IndicatorKind::Donchian),
            "pivots" | "pivot" => Ok(IndicatorKind::Pivots),
            "supertrend" => Ok(IndicatorKind::SuperTrend),
            "volume" => Ok(IndicatorKind::Volume),
            _ => Err(anyhow!("Unknown indicator: '{}'", s)),
        }
    }
}

/// Set of enabled indicator families. Parses from `all` or a comma list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledIndicators(BTreeSet<IndicatorKind>);

impl Default for EnabledIndicators {
    fn default() -> Self {
        Self::all()
    }
}

impl EnabledIndicators {
    pub fn all() -> Self {
        Self(IndicatorKind::all().into_iter().collect())
    }

    pub fn only(kinds: &[IndicatorKind]) -> Self {
        Self(kinds.iter().copied().collect())
    }

    pub fn is_enabled(&self, kind: IndicatorKind) -> bool {
        self.0.contains(&kind)
    }

    /// Blanks the fields of every disabled family.
    fn mask(&self, snap: &mut IndicatorSnapshot) {
        if !self.is_enabled(IndicatorKind::Rsi) {
            snap.rsi = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Macd) {
            snap.macd = f64::NAN;
            snap.macd_signal = f64::NAN;
            snap.macd_histogram = f64::NAN;
            snap.prev_macd = f64::NAN;
            snap.prev_macd_signal = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::MovingAverages) {
            snap.ema_short = f64::NAN;
            snap.ema_medium = f64::NAN;
            snap.sma_long = f64::NAN;
            snap.trend = None;
        }
        if !self.is_enabled(IndicatorKind::Bollinger) {
            snap.bb_mid = f64::NAN;
            snap.bb_upper = f64::NAN;
            snap.bb_lower = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Atr) {
            snap.atr = f64::NAN;
            snap.atr_mean = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Adx) {
            snap.adx = f64::NAN;
            snap.plus_di = f64::NAN;
            snap.minus_di = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Obv) {
            snap.obv = f64::NAN;
            snap.obv_delta = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Mfi) {
            snap.mfi = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Cci) {
            snap.cci = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Stochastic) {
            snap.stochastic_k = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Vwap) {
            snap.vwap = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Ichimoku) {
            snap.ichimoku = IchimokuLines::UNDEFINED;
        }
        if !self.is_enabled(IndicatorKind::Donchian) {
            snap.donchian_high = f64::NAN;
            snap.donchian_low = f64::NAN;
        }
        if !self.is_enabled(IndicatorKind::Pivots) {
            snap.pivots = PivotLevels::UNDEFINED;
        }
        if !self.is_enabled(IndicatorKind::SuperTrend) {
            snap.supertrend = None;
        }
        if !self.is_enabled(IndicatorKind::Volume) {
            snap.volume_mean = f64::NAN;
        }
    }
}

impl FromStr for EnabledIndicators {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        let kinds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(IndicatorKind::from_str)
            .collect::<Result<BTreeSet<_>>>()?;
        if kinds.is_empty() {
            bail!("At least one indicator must be enabled");
        }
        Ok(Self(kinds))
    }
}

impl fmt::Display for EnabledIndicators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|k| format!("{:?}", k)).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Running state of every indicator for one pass over a series.
#[derive(Debug, Clone)]
struct IndicatorSet {
    macd_slow: usize,
    macd_signal_period: usize,
    bb_period: usize,
    closes_seen: usize,

    rsi: Rsi,
    macd: MovingAverageConvergenceDivergence,
    ema_short: Warmed<ExponentialMovingAverage>,
    ema_medium: Warmed<ExponentialMovingAverage>,
    sma_long: Warmed<SimpleMovingAverage>,
    bollinger: BollingerBands,
    atr: Atr,
    atr_mean: Warmed<SimpleMovingAverage>,
    adx: Adx,
    obv: OnBalanceVolume,
    mfi: Mfi,
    cci: Cci,
    stochastic: Stochastic,
    vwap: Vwap,
    ichimoku: Ichimoku,
    donchian: Donchian,
    supertrend: SuperTrend,
    volume_mean: Warmed<SimpleMovingAverage>,

    prev_macd: f64,
    prev_macd_signal: f64,
    prev_obv: f64,
}

fn ta_err(name: &str) -> impl Fn(ta::errors::TaError) -> anyhow::Error + '_ {
    move |e| anyhow!("Invalid {} parameters: {:?}", name, e)
}

impl IndicatorSet {
    fn new(p: &IndicatorParams) -> Result<Self> {
        let ema = |period: usize| -> Result<Warmed<ExponentialMovingAverage>> {
            Ok(Warmed::new(
                ExponentialMovingAverage::new(period).map_err(ta_err("EMA"))?,
                period,
            ))
        };
        let sma = |period: usize| -> Result<Warmed<SimpleMovingAverage>> {
            Ok(Warmed::new(
                SimpleMovingAverage::new(period).map_err(ta_err("SMA"))?,
                period,
            ))
        };

        Ok(Self {
            macd_slow: p.macd_slow,
            macd_signal_period: p.macd_signal,
            bb_period: p.bb_period,
            closes_seen: 0,
            rsi: Rsi::new(p.rsi_period),
            macd: MovingAverageConvergenceDivergence::new(p.macd_fast, p.macd_slow, p.macd_signal)
                .map_err(ta_err("MACD"))?,
            ema_short: ema(p.ema_short)?,
            ema_medium: ema(p.ema_medium)?,
            sma_long: sma(p.sma_long)?,
            bollinger: BollingerBands::new(p.bb_period, p.bb_std_dev)
                .map_err(ta_err("Bollinger"))?,
            atr: Atr::new(p.atr_period),
            atr_mean: sma(p.atr_mean_period)?,
            adx: Adx::new(p.adx_period),
            obv: OnBalanceVolume::new(),
            mfi: Mfi::new(p.mfi_period),
            cci: Cci::new(p.cci_period),
            stochastic: Stochastic::new(p.stochastic_period)?,
            vwap: Vwap::default(),
            ichimoku: Ichimoku::new(p.ichimoku_tenkan, p.ichimoku_kijun, p.ichimoku_senkou_b)?,
            donchian: Donchian::new(p.donchian_period)?,
            supertrend: SuperTrend::new(p.supertrend_period, p.supertrend_multiplier),
            volume_mean: sma(p.volume_mean_period)?,
            prev_macd: f64::NAN,
            prev_macd_signal: f64::NAN,
            prev_obv: f64::NAN,
        })
    }

    fn next(&mut self, candles: &[Candle], index: usize, candle: &Candle) -> IndicatorSnapshot {
        let close = candle.close;
        self.closes_seen += 1;

        let mut snap = IndicatorSnapshot::empty(candle.timestamp, close, candle.volume);

        snap.rsi = self.rsi.next(close);

        let macd = self.macd.next(close);
        snap.macd = if self.closes_seen >= self.macd_slow {
            macd.macd
        } else {
            f64::NAN
        };
        snap.macd_signal = if self.closes_seen >= self.macd_slow + self.macd_signal_period - 1 {
            macd.signal
        } else {
            f64::NAN
        };
        snap.macd_histogram = snap.macd - snap.macd_signal;
        snap.prev_macd = self.prev_macd;
        snap.prev_macd_signal = self.prev_macd_signal;
        self.prev_macd = snap.macd;
        self.prev_macd_signal = snap.macd_signal;

        snap.ema_short = self.ema_short.next(close);
        snap.ema_medium = self.ema_medium.next(close);
        snap.sma_long = self.sma_long.next(close);
        if snap.ema_short.is_finite() && snap.ema_medium.is_finite() {
            snap.trend = Some(if snap.ema_short > snap.ema_medium {
                TrendDirection::Bull
            } else {
                TrendDirection::Bear
            });
        }

        let bb = self.bollinger.next(close);
        if self.closes_seen >= self.bb_period {
            snap.bb_mid = bb.average;
            snap.bb_upper = bb.upper;
            snap.bb_lower = bb.lower;
        }

        snap.atr = self.atr.next(candle);
        snap.atr_mean = self.atr_mean.next(snap.atr);

        let directional = self.adx.next(candle);
        snap.adx = directional.adx;
        snap.plus_di = directional.plus_di;
        snap.minus_di = directional.minus_di;

        snap.obv = self.obv.next(candle);
        snap.obv_delta = snap.obv - self.prev_obv;
        self.prev_obv = snap.obv;

        snap.mfi = self.mfi.next(candle);
        snap.cci = self.cci.next(candle);
        snap.stochastic_k = self.stochastic.next(candle);
        snap.vwap = self.vwap.next(candle);
        snap.ichimoku = self.ichimoku.next(candle);

        let (donchian_high, donchian_low) = self.donchian.next(candle);
        snap.donchian_high = donchian_high;
        snap.donchian_low = donchian_low;

        snap.pivots = prior_pivots(candles, index);
        snap.supertrend = self.supertrend.next(candle);
        snap.volume_mean = self.volume_mean.next(candle.volume);

        snap
    }
}

/// Turns an ordered series into per-candle indicator snapshots.
///
/// Holds no state between calls: every computation starts from fresh
/// indicator state, so the same series always yields the same output.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
    enabled: EnabledIndicators,
    prototype: IndicatorSet,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams, enabled: EnabledIndicators) -> Result<Self> {
        params.validate()?;
        let prototype = IndicatorSet::new(&params)?;
        Ok(Self {
            params,
            enabled,
            prototype,
        })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn enabled(&self) -> &EnabledIndicators {
        &self.enabled
    }

    /// One snapshot per candle, oldest first. Leading entries are NaN until
    /// each indicator's window fills.
    pub fn compute_curve(&self, series: &Series) -> Vec<IndicatorSnapshot> {
        let candles = series.candles();
        let mut set = self.prototype.clone();
        candles
            .iter()
            .enumerate()
            .map(|(index, candle)| {
                let mut snap = set.next(candles, index, candle);
                self.enabled.mask(&mut snap);
                snap
            })
            .collect()
    }

    /// Snapshot of the last candle, `None` for an empty series.
    pub fn snapshot(&self, series: &Series) -> Option<IndicatorSnapshot> {
        self.compute_curve(series).pop()
    }
}
