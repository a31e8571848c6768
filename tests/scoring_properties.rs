use chrono::Utc;
use rustscore::application::scoring::Scorer;
use rustscore::domain::analysis::{
    IndicatorSnapshot, ScoringPolicy, SignalLabel, SignalThresholds, TimeframeWeights,
};
use rustscore::domain::market::Timeframe;
use std::collections::BTreeMap;

fn scorer() -> Scorer {
    Scorer::new(ScoringPolicy {
        timeframe_weights: TimeframeWeights::single(Timeframe::OneHour),
        ..ScoringPolicy::default()
    })
}

fn snapshot(close: f64, rsi: f64, ema_short: f64, ema_medium: f64, macd: f64, signal: f64) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::empty(Utc::now(), close, 100.0);
    snap.rsi = rsi;
    snap.ema_short = ema_short;
    snap.ema_medium = ema_medium;
    snap.macd = macd;
    snap.macd_signal = signal;
    snap.macd_histogram = macd - signal;
    snap.bb_lower = close * 0.9;
    snap.bb_upper = close * 1.1;
    snap.volume_mean = 100.0;
    snap
}

fn one(snap: IndicatorSnapshot) -> BTreeMap<Timeframe, IndicatorSnapshot> {
    let mut map = BTreeMap::new();
    map.insert(Timeframe::OneHour, snap);
    map
}

#[test]
fn test_score_stays_in_range_for_hostile_inputs() {
    let scorer = scorer();
    let weird = [
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        -1e12,
        0.0,
        1e12,
        -5.0,
        250.0,
    ];
    for &a in &weird {
        for &b in &weird {
            let snap = snapshot(a, b, a, b, b, a);
            for sentiment in [None, Some(a), Some(b), Some(-40.0), Some(400.0)] {
                let score = scorer.score(&one(snap.clone()), sentiment);
                assert!(
                    (0.0..=10.0).contains(&score.value),
                    "score {} for {:?}/{:?}",
                    score.value,
                    a,
                    b
                );
                assert_eq!(score.label, SignalThresholds::default().label_for(score.value));
            }
        }
    }
}

#[test]
fn test_extremes_reach_both_ends() {
    let scorer = scorer();

    let bullish = {
        let mut s = snapshot(80.0, 10.0, 110.0, 100.0, 2.0, 1.0);
        s.volume = 200.0;
        s.bb_lower = 85.0;
        s
    };
    let best = scorer.score(&one(bullish), Some(100.0));
    assert_eq!(best.label, SignalLabel::StrongBuy);

    let bearish = {
        let mut s = snapshot(120.0, 90.0, 90.0, 100.0, 1.0, 2.0);
        s.volume = 10.0;
        s.bb_upper = 110.0;
        s
    };
    let worst = scorer.score(&one(bearish), Some(0.0));
    assert_eq!(worst.label, SignalLabel::StrongSell);
    assert!(worst.value < best.value);
}

#[test]
fn test_empty_snapshots_score_neutral() {
    let score = scorer().score(&BTreeMap::new(), None);
    assert_eq!(score.value, 5.0);
    assert_eq!(score.label, SignalLabel::Neutral);
    assert!(score.breakdown.iter().all(|b| !b.present));
}

#[test]
fn test_label_boundaries() {
    let t = SignalThresholds::default();
    let cases = [
        (10.0, SignalLabel::StrongBuy),
        (8.1, SignalLabel::StrongBuy),
        (8.0, SignalLabel::Buy),
        (6.1, SignalLabel::Buy),
        (6.0, SignalLabel::Neutral),
        (4.0, SignalLabel::Neutral),
        (3.9, SignalLabel::Sell),
        (2.0, SignalLabel::Sell),
        (1.9, SignalLabel::StrongSell),
        (0.0, SignalLabel::StrongSell),
    ];
    for (value, expected) in cases {
        assert_eq!(t.label_for(value), expected, "value {}", value);
    }
}

#[test]
fn test_score_rounds_to_one_decimal() {
    let scorer = scorer();
    for rsi in [31.0, 44.4, 55.5, 68.8] {
        let score = scorer.score(&one(snapshot(100.0, rsi, 100.0, 100.0, 0.0, 0.0)), Some(37.0));
        assert!(((score.value * 10.0).round() - score.value * 10.0).abs() < 1e-9);
    }
}
