use chrono::{Duration, TimeZone, Utc};
use rustscore::application::indicators::{EnabledIndicators, IndicatorEngine, IndicatorParams};
use rustscore::application::scoring::Scorer;
use rustscore::domain::analysis::{ScoringPolicy, SignalLabel, TimeframeWeights};
use rustscore::domain::market::{Candle, Series, Timeframe};
use std::collections::BTreeMap;

fn engine() -> IndicatorEngine {
    IndicatorEngine::new(IndicatorParams::default(), EnabledIndicators::all()).unwrap()
}

/// (high, low, close) per candle; open is the previous close.
fn series(bars: &[(f64, f64, f64)]) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut prev = bars.first().map(|b| b.2).unwrap_or(0.0);
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(high, low, close))| {
            let candle = Candle::new(start + Duration::hours(i as i64), prev, high, low, close, 100.0);
            prev = close;
            candle
        })
        .collect();
    Series::new("BTC-USD", Timeframe::OneHour, candles)
}

fn flat(price: f64, n: usize) -> Vec<(f64, f64, f64)> {
    vec![(price, price, price); n]
}

/// Deterministic random walk that stays positive.
fn random_walk(n: usize, seed: u64) -> Vec<(f64, f64, f64)> {
    let mut state = seed;
    let mut price = 100.0;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price = (price * (1.0 + 0.04 * step)).max(1.0);
            (price * 1.005, price * 0.995, price)
        })
        .collect()
}

#[test]
fn test_flat_market_reads_neutral() {
    let engine = engine();
    let snap = engine.snapshot(&series(&flat(100.0, 250))).unwrap();

    assert_eq!(snap.rsi, 50.0);
    assert_eq!(snap.adx, 0.0);
    assert!((snap.bb_upper - 100.0).abs() < 1e-6);
    assert!((snap.bb_lower - 100.0).abs() < 1e-6);
    assert_eq!(snap.atr, 0.0);

    let mut snapshots = BTreeMap::new();
    snapshots.insert(Timeframe::OneHour, snap);
    let scorer = Scorer::new(ScoringPolicy {
        timeframe_weights: TimeframeWeights::single(Timeframe::OneHour),
        ..ScoringPolicy::default()
    });
    let score = scorer.score(&snapshots, None);
    assert_eq!(score.value, 5.0);
    assert_eq!(score.label, SignalLabel::Neutral);
}

#[test]
fn test_sudden_drop_lifts_atr_and_sinks_rsi() {
    let engine = engine();
    let mut bars = flat(100.0, 50);
    bars.push((100.0, 90.0, 90.0));

    let curve = engine.compute_curve(&series(&bars));
    let before = &curve[49];
    let after = &curve[50];

    assert_eq!(before.atr, 0.0);
    assert!(after.atr > before.atr);
    assert!(after.rsi < 50.0);
    assert!(after.close < after.bb_lower);
}

#[test]
fn test_rsi_stays_in_bounds() {
    let engine = engine();
    for seed in [1, 7, 42, 1234] {
        for snap in engine.compute_curve(&series(&random_walk(300, seed))) {
            if snap.rsi.is_finite() {
                assert!((0.0..=100.0).contains(&snap.rsi), "rsi {}", snap.rsi);
            }
            if snap.mfi.is_finite() {
                assert!((0.0..=100.0).contains(&snap.mfi), "mfi {}", snap.mfi);
            }
            if snap.stochastic_k.is_finite() {
                assert!((0.0..=100.0).contains(&snap.stochastic_k));
            }
        }
    }
}

#[test]
fn test_histogram_is_line_minus_signal() {
    let engine = engine();
    for snap in engine.compute_curve(&series(&random_walk(200, 99))) {
        if snap.macd_histogram.is_finite() {
            assert!((snap.macd_histogram - (snap.macd - snap.macd_signal)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_long_enough_series_is_fully_defined() {
    let engine = engine();
    let lookback = engine.params().longest_lookback();
    for seed in [3, 11, 2024] {
        let snap = engine.snapshot(&series(&random_walk(lookback, seed))).unwrap();
        assert!(snap.is_complete(), "undefined: {:?}", snap.undefined_fields());
    }
}

#[test]
fn test_repeated_computation_is_identical() {
    let engine = engine();
    let s = series(&random_walk(260, 5));
    let first = engine.compute_curve(&s);
    let second = engine.compute_curve(&s);
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
}

#[test]
fn test_hourly_snapshot_pivots_come_from_previous_day() {
    let engine = engine();
    let mut bars: Vec<(f64, f64, f64)> = vec![(104.0, 92.0, 100.0); 24];
    bars[3] = (110.0, 95.0, 100.0);
    bars[9] = (105.0, 90.0, 100.0);
    bars[23] = (106.0, 96.0, 102.0);
    bars.extend(vec![(207.0, 205.0, 206.0); 24]);

    let snap = engine.snapshot(&series(&bars)).unwrap();
    let expected = (110.0 + 90.0 + 102.0) / 3.0;
    assert!((snap.pivots.pivot - expected).abs() < 1e-9, "{:?}", snap.pivots);
    assert!((snap.pivots.r1 - (2.0 * expected - 90.0)).abs() < 1e-9);
    assert!((snap.pivots.s1 - (2.0 * expected - 110.0)).abs() < 1e-9);
}
