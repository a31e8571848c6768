use super::contributions::{Contributions, sentiment_contribution};
use crate::domain::analysis::{
    IndicatorSnapshot, Score, ScoringPolicy, SignalLabel, TimeframeContribution, TrendDirection,
};
use crate::domain::market::Timeframe;
use std::collections::BTreeMap;

/// Combines per-timeframe snapshots and sentiment into a 0-10 score.
#[derive(Debug, Clone)]
pub struct Scorer {
    policy: ScoringPolicy,
}

impl Scorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Weighted score across the configured timeframes. A configured
    /// timeframe with no snapshot contributes neutral values; snapshots for
    /// timeframes without a weight are ignored.
    pub fn score(
        &self,
        snapshots: &BTreeMap<Timeframe, IndicatorSnapshot>,
        sentiment: Option<f64>,
    ) -> Score {
        let w = &self.policy.weights;

        let breakdown: Vec<TimeframeContribution> = self
            .policy
            .timeframe_weights
            .iter()
            .map(|(timeframe, timeframe_weight)| {
                let snapshot = snapshots.get(&timeframe);
                let c = snapshot
                    .map(|s| Contributions::from_snapshot(s, self.policy.macd_epsilon))
                    .unwrap_or(Contributions::NEUTRAL);
                let composite = w.rsi * c.rsi
                    + w.trend * c.trend
                    + w.macd * c.macd
                    + w.bollinger * c.bollinger
                    + w.volume * c.volume;
                TimeframeContribution {
                    timeframe,
                    present: snapshot.is_some(),
                    rsi: c.rsi,
                    trend: c.trend,
                    macd: c.macd,
                    bollinger: c.bollinger,
                    volume: c.volume,
                    composite,
                    timeframe_weight,
                }
            })
            .collect();

        let sentiment_part = sentiment_contribution(sentiment);
        let indicators: f64 = breakdown
            .iter()
            .map(|b| b.timeframe_weight * b.composite)
            .sum();
        let total = indicators + w.sentiment * sentiment_part;
        let total = if total.is_finite() {
            total.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let value = (total * 100.0).round() / 10.0;

        Score {
            value,
            label: self.policy.thresholds.label_for(value),
            sentiment_contribution: sentiment_part,
            breakdown,
        }
    }

    /// Agreement of the trend classifier across timeframes.
    pub fn consensus(&self, snapshots: &BTreeMap<Timeframe, IndicatorSnapshot>) -> SignalLabel {
        let balance: i32 = snapshots
            .values()
            .map(|s| match s.trend {
                Some(TrendDirection::Bull) => 1,
                Some(TrendDirection::Bear) => -1,
                None => 0,
            })
            .sum();
        if balance >= 2 {
            SignalLabel::StrongBuy
        } else if balance <= -2 {
            SignalLabel::StrongSell
        } else {
            SignalLabel::Neutral
        }
    }
}

/// One line per timeframe explaining the score, used as alert rationale.
pub fn rationale(score: &Score) -> String {
    let mut lines: Vec<String> = score
        .breakdown
        .iter()
        .map(|b| {
            if b.present {
                format!(
                    "{}: RSI {:.2}, trend {:.2}, MACD {:.2}, BB {:.2}, volume {:.2} (weight {:.2})",
                    b.timeframe,
                    b.rsi,
                    b.trend,
                    b.macd,
                    b.bollinger,
                    b.volume,
                    b.timeframe_weight
                )
            } else {
                format!("{}: no data, neutral", b.timeframe)
            }
        })
        .collect();
    lines.push(format!("sentiment {:.2}", score.sentiment_contribution));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn neutral_snapshot() -> IndicatorSnapshot {
        let mut s = IndicatorSnapshot::empty(Utc::now(), 100.0, 10.0);
        s.rsi = 50.0;
        s.ema_short = 100.0;
        s.ema_medium = 100.0;
        s.macd = 0.0;
        s.macd_signal = 0.0;
        s.bb_lower = 100.0;
        s.bb_upper = 100.0;
        s.volume_mean = 10.0;
        s
    }

    fn bullish_snapshot() -> IndicatorSnapshot {
        let mut s = neutral_snapshot();
        s.rsi = 20.0;
        s.ema_short = 110.0;
        s.macd = 2.0;
        s.bb_lower = 101.0;
        s.bb_upper = 120.0;
        s.volume = 20.0;
        s.trend = Some(TrendDirection::Bull);
        s
    }

    fn all(snap: IndicatorSnapshot) -> BTreeMap<Timeframe, IndicatorSnapshot> {
        [Timeframe::OneHour, Timeframe::SixHour, Timeframe::OneDay]
            .into_iter()
            .map(|tf| (tf, snap.clone()))
            .collect()
    }

    #[test]
    fn test_all_neutral_scores_five() {
        let scorer = Scorer::new(ScoringPolicy::default());
        let score = scorer.score(&all(neutral_snapshot()), None);
        assert_eq!(score.value, 5.0);
        assert_eq!(score.label, SignalLabel::Neutral);
        assert_eq!(score.breakdown.len(), 3);
    }

    #[test]
    fn test_missing_input_is_neutral() {
        let scorer = Scorer::new(ScoringPolicy::default());
        let score = scorer.score(&BTreeMap::new(), None);
        assert_eq!(score.value, 5.0);
        assert!(score.breakdown.iter().all(|b| !b.present));
    }

    #[test]
    fn test_bullish_everywhere_is_strong_buy() {
        let scorer = Scorer::new(ScoringPolicy::default());
        let score = scorer.score(&all(bullish_snapshot()), Some(100.0));
        // 0.15*1 + 0.30*1 + 0.25*0.8 + 0.10*1 + 0.10*0.8 = 0.83, + 0.1 sentiment
        assert_eq!(score.value, 9.3);
        assert_eq!(score.label, SignalLabel::StrongBuy);
    }

    #[test]
    fn test_timeframe_weighting() {
        let scorer = Scorer::new(ScoringPolicy::default());
        let mut snaps = all(neutral_snapshot());
        snaps.insert(Timeframe::OneDay, bullish_snapshot());
        let daily_bull = scorer.score(&snaps, None).value;

        let mut snaps = all(neutral_snapshot());
        snaps.insert(Timeframe::OneHour, bullish_snapshot());
        let hourly_bull = scorer.score(&snaps, None).value;
        assert!(daily_bull > hourly_bull);
    }

    #[test]
    fn test_consensus() {
        let scorer = Scorer::new(ScoringPolicy::default());
        assert_eq!(scorer.consensus(&all(bullish_snapshot())), SignalLabel::StrongBuy);
        assert_eq!(scorer.consensus(&all(neutral_snapshot())), SignalLabel::Neutral);

        let mut bear = neutral_snapshot();
        bear.trend = Some(TrendDirection::Bear);
        let mut snaps = all(bear);
        snaps.insert(Timeframe::OneHour, bullish_snapshot());
        // -2 + 1
        assert_eq!(scorer.consensus(&snaps), SignalLabel::Neutral);
    }

    #[test]
    fn test_rationale_lists_timeframes() {
        let scorer = Scorer::new(ScoringPolicy::default());
        let mut snaps = BTreeMap::new();
        snaps.insert(Timeframe::OneHour, bullish_snapshot());
        let text = rationale(&scorer.score(&snaps, Some(40.0)));
        assert!(text.contains("1h: RSI 1.00"));
        assert!(text.contains("1d: no data"));
        assert!(text.contains("sentiment 0.40"));
    }
}
