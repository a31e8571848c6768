use super::score::SignalLabel;
use crate::domain::errors::ConfigError;
use crate::domain::market::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative importance of each sub-indicator. Indicator weights plus the
/// sentiment weight must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub trend: f64,
    pub macd: f64,
    pub rsi: f64,
    pub bollinger: f64,
    pub volume: f64,
    pub sentiment: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trend: 0.30,
            macd: 0.25,
            rsi: 0.15,
            bollinger: 0.10,
            volume: 0.10,
            sentiment: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Sum of the per-timeframe indicator weights (sentiment excluded).
    pub fn indicator_total(&self) -> f64 {
        self.trend + self.macd + self.rsi + self.bollinger + self.volume
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("trend", self.trend),
            ("macd", self.macd),
            ("rsi", self.rsi),
            ("bollinger", self.bollinger),
            ("volume", self.volume),
            ("sentiment", self.sentiment),
        ];
        if let Some((name, w)) = all.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid {
                key: format!("weights.{}", name),
                reason: format!("weight must be a non-negative number, got {}", w),
            });
        }
        let total = self.indicator_total() + self.sentiment;
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid {
                key: "weights".to_string(),
                reason: format!("indicator + sentiment weights must sum to 1.0, got {:.4}", total),
            });
        }
        Ok(())
    }
}

/// Weight of each timeframe's composite in the final score.
///
/// Serialized as a table keyed by interval string (`"1h" = 0.2`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct TimeframeWeights(BTreeMap<Timeframe, f64>);

impl TryFrom<BTreeMap<String, f64>> for TimeframeWeights {
    type Error = String;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(key, weight)| {
                key.parse::<Timeframe>()
                    .map(|tf| (tf, weight))
                    .map_err(|e| e.to_string())
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl From<TimeframeWeights> for BTreeMap<String, f64> {
    fn from(weights: TimeframeWeights) -> Self {
        weights
            .0
            .into_iter()
            .map(|(tf, w)| (tf.to_string(), w))
            .collect()
    }
}

impl Default for TimeframeWeights {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::OneHour, 0.20);
        map.insert(Timeframe::SixHour, 0.30);
        map.insert(Timeframe::OneDay, 0.50);
        Self(map)
    }
}

impl TimeframeWeights {
    pub fn new(weights: BTreeMap<Timeframe, f64>) -> Self {
        Self(weights)
    }

    /// A single timeframe carrying the full weight.
    pub fn single(timeframe: Timeframe) -> Self {
        let mut map = BTreeMap::new();
        map.insert(timeframe, 1.0);
        Self(map)
    }

    /// Splits weight across `timeframes` proportionally to their duration, so
    /// longer timeframes weigh more.
    pub fn proportional(timeframes: &[Timeframe]) -> Self {
        let total: usize = timeframes.iter().map(|tf| tf.to_minutes()).sum();
        let map = timeframes
            .iter()
            .map(|tf| (*tf, tf.to_minutes() as f64 / total.max(1) as f64))
            .collect();
        Self(map)
    }

    pub fn get(&self, timeframe: Timeframe) -> Option<f64> {
        self.0.get(&timeframe).copied()
    }

    pub fn timeframes(&self) -> impl Iterator<Item = Timeframe> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timeframe, f64)> + '_ {
        self.0.iter().map(|(tf, w)| (*tf, *w))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::Invalid {
                key: "timeframe_weights".to_string(),
                reason: "at least one timeframe weight is required".to_string(),
            });
        }
        if let Some((tf, w)) = self.0.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(ConfigError::Invalid {
                key: format!("timeframe_weights.{}", tf),
                reason: format!("weight must be a non-negative number, got {}", w),
            });
        }
        let total: f64 = self.0.values().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid {
                key: "timeframe_weights".to_string(),
                reason: format!("timeframe weights must sum to 1.0, got {:.4}", total),
            });
        }
        Ok(())
    }
}

/// Cut points mapping a 0–10 score to a label.
///
/// score > strong_buy → Strong Buy, > buy → Buy, >= neutral → Neutral,
/// >= sell → Sell, otherwise Strong Sell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub neutral: f64,
    pub sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 8.0,
            buy: 6.0,
            neutral: 4.0,
            sell: 2.0,
        }
    }
}

impl SignalThresholds {
    pub fn label_for(&self, score: f64) -> SignalLabel {
        if !score.is_finite() {
            return SignalLabel::Neutral;
        }
        if score > self.strong_buy {
            SignalLabel::StrongBuy
        } else if score > self.buy {
            SignalLabel::Buy
        } else if score >= self.neutral {
            SignalLabel::Neutral
        } else if score >= self.sell {
            SignalLabel::Sell
        } else {
            SignalLabel::StrongSell
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.sell <= self.neutral && self.neutral <= self.buy && self.buy <= self.strong_buy;
        let in_range = [self.sell, self.neutral, self.buy, self.strong_buy]
            .iter()
            .all(|v| (0.0..=10.0).contains(v));
        if !ordered || !in_range {
            return Err(ConfigError::Invalid {
                key: "thresholds".to_string(),
                reason: format!(
                    "expected 0 <= sell <= neutral <= buy <= strong_buy <= 10, got {:?}",
                    self
                ),
            });
        }
        Ok(())
    }
}

/// Everything the scorer needs besides the snapshots themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: ScoringWeights,
    pub timeframe_weights: TimeframeWeights,
    pub thresholds: SignalThresholds,
    /// |MACD - signal| at or below this is treated as no cross
    pub macd_epsilon: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            timeframe_weights: TimeframeWeights::default(),
            thresholds: SignalThresholds::default(),
            macd_epsilon: 1e-6,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.timeframe_weights.validate()?;
        self.thresholds.validate()?;
        if !self.macd_epsilon.is_finite() || self.macd_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                key: "macd_epsilon".to_string(),
                reason: format!("must be >= 0, got {}", self.macd_epsilon),
            });
        }
        Ok(())
    }
}
