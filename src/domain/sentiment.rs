use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const QUOTE_SUFFIXES: [&str; 5] = ["USDT", "USDC", "BUSD", "USD", "EUR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentClassification {
    ExtremeFear,
    Fear,
    Greed,
    ExtremeGreed,
}

impl fmt::Display for SentimentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtremeFear => write!(f, "Extreme Fear"),
            Self::Fear => write!(f, "Fear"),
            Self::Greed => write!(f, "Greed"),
            Self::ExtremeGreed => write!(f, "Extreme Greed"),
        }
    }
}

impl SentimentClassification {
    /// Bands of the Fear & Greed index: <25, <50, <75, rest.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::ExtremeFear,
            25..=49 => Self::Fear,
            50..=74 => Self::Greed,
            _ => Self::ExtremeGreed,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::ExtremeFear => "😱",
            Self::Fear => "😟",
            Self::Greed => "😃",
            Self::ExtremeGreed => "🤑",
        }
    }
}

/// A Fear & Greed index reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub value: u8, // 0-100
    pub classification: SentimentClassification,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Fetch the current market sentiment
    async fn fetch_sentiment(&self) -> anyhow::Result<Sentiment>;
}

/// Market-wide attention signals: what is trending and how much the total
/// market capitalisation moved.
#[async_trait]
pub trait MarketBuzzProvider: Send + Sync {
    /// Upper-cased ticker symbols currently trending.
    async fn fetch_trending(&self) -> anyhow::Result<Vec<String>>;

    /// 24h change of the total market capitalisation, in percent.
    async fn fetch_market_cap_change_24h(&self) -> anyhow::Result<f64>;
}

/// Overall reading of the sentiment columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentMood {
    Positive,
    Neutral,
    Negative,
}

impl SentimentMood {
    pub fn decorated(&self) -> &'static str {
        match self {
            SentimentMood::Positive => "🟢 Positive",
            SentimentMood::Neutral => "⚪ Neutral",
            SentimentMood::Negative => "🔴 Negative",
        }
    }
}

/// Everything fetched once per cycle, shared by every symbol. Each part is
/// `None` when its source failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketMood {
    pub fear_greed: Option<Sentiment>,
    pub trending: Option<Vec<String>>,
    pub market_cap_change_24h: Option<f64>,
}

impl MarketMood {
    pub fn for_symbol(&self, symbol: &str) -> SymbolSentiment {
        let fear_greed_index = self.fear_greed.as_ref().map(|s| s.value as f64);
        let fear_greed_label = self.fear_greed.as_ref().map(|s| s.classification);

        let social_score = self.trending.as_ref().map(|trending| {
            let base = base_asset(symbol);
            if trending.iter().any(|t| t.eq_ignore_ascii_case(base)) {
                100.0
            } else {
                (10.0 * trending.len() as f64).min(100.0)
            }
        });

        let news_intensity = self
            .market_cap_change_24h
            .filter(|c| c.is_finite())
            .map(|change| (change.abs() / 5.0).min(1.0));

        let parts: Vec<f64> = [
            fear_greed_index,
            social_score,
            news_intensity.map(|n| n * 100.0),
        ]
        .into_iter()
        .flatten()
        .collect();
        let score = if parts.is_empty() {
            None
        } else {
            Some(parts.iter().sum::<f64>() / parts.len() as f64)
        };

        SymbolSentiment {
            fear_greed_index,
            fear_greed_label,
            social_score,
            news_intensity,
            score,
        }
    }
}

/// Sentiment inputs resolved for one symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SymbolSentiment {
    pub fear_greed_index: Option<f64>,
    pub fear_greed_label: Option<SentimentClassification>,
    /// 100 when the symbol is trending, otherwise 10 per trending coin capped at 100
    pub social_score: Option<f64>,
    /// |24h market-cap change| / 5%, capped at 1
    pub news_intensity: Option<f64>,
    /// Mean of the available readings on a 0-100 scale
    pub score: Option<f64>,
}

impl SymbolSentiment {
    /// News intensity peaks in mood at 0.5: both a dead and a frantic market
    /// read as less positive.
    pub fn mood(&self) -> SentimentMood {
        let vals: Vec<f64> = [
            self.fear_greed_index.map(|v| v / 100.0),
            self.social_score.map(|v| v / 100.0),
            self.news_intensity.map(|n| 1.0 - (n - 0.5).abs() * 2.0),
        ]
        .into_iter()
        .flatten()
        .collect();

        if vals.is_empty() {
            return SentimentMood::Neutral;
        }
        let mean = vals.iter().sum::<f64>() / vals.len() as f64;
        if mean >= 0.7 {
            SentimentMood::Positive
        } else if mean >= 0.5 {
            SentimentMood::Neutral
        } else {
            SentimentMood::Negative
        }
    }
}

/// "BTC-USD" → "BTC", "ETHUSDT" → "ETH".
pub fn base_asset(symbol: &str) -> &str {
    if let Some((base, _)) = symbol.split_once(['-', '/']) {
        return base;
    }
    QUOTE_SUFFIXES
        .iter()
        .find_map(|quote| symbol.strip_suffix(quote).filter(|b| !b.is_empty()))
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: u8) -> Sentiment {
        Sentiment {
            value,
            classification: SentimentClassification::from_score(value),
            timestamp: Utc::now(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(SentimentClassification::from_score(10), SentimentClassification::ExtremeFear);
        assert_eq!(SentimentClassification::from_score(25), SentimentClassification::Fear);
        assert_eq!(SentimentClassification::from_score(50), SentimentClassification::Greed);
        assert_eq!(SentimentClassification::from_score(75), SentimentClassification::ExtremeGreed);
    }

    #[test]
    fn test_base_asset() {
        assert_eq!(base_asset("BTC-USD"), "BTC");
        assert_eq!(base_asset("ETHUSDT"), "ETH");
        assert_eq!(base_asset("SOL/EUR"), "SOL");
        assert_eq!(base_asset("USDT"), "USDT");
    }

    #[test]
    fn test_trending_symbol_scores_full_social() {
        let mood = MarketMood {
            fear_greed: Some(reading(60)),
            trending: Some(vec!["SOL".to_string(), "PEPE".to_string()]),
            market_cap_change_24h: Some(-2.5),
        };
        let sol = mood.for_symbol("SOL-USD");
        assert_eq!(sol.social_score, Some(100.0));
        assert_eq!(sol.news_intensity, Some(0.5));
        assert_eq!(sol.score, Some((60.0 + 100.0 + 50.0) / 3.0));
        assert_eq!(sol.fear_greed_label, Some(SentimentClassification::Greed));

        let btc = mood.for_symbol("BTC-USD");
        assert_eq!(btc.social_score, Some(20.0));
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let mood = MarketMood {
            fear_greed: None,
            trending: None,
            market_cap_change_24h: Some(12.0),
        };
        let s = mood.for_symbol("BTC-USD");
        assert_eq!(s.news_intensity, Some(1.0));
        assert_eq!(s.score, Some(100.0));

        let empty = MarketMood::default().for_symbol("BTC-USD");
        assert_eq!(empty.score, None);
        assert_eq!(empty.mood(), SentimentMood::Neutral);
    }

    #[test]
    fn test_mood_thresholds() {
        let positive = SymbolSentiment {
            fear_greed_index: Some(80.0),
            social_score: Some(100.0),
            news_intensity: Some(0.5),
            ..Default::default()
        };
        assert_eq!(positive.mood(), SentimentMood::Positive);

        let negative = SymbolSentiment {
            fear_greed_index: Some(10.0),
            social_score: Some(0.0),
            news_intensity: Some(1.0),
            ..Default::default()
        };
        assert_eq!(negative.mood(), SentimentMood::Negative);
    }
}
