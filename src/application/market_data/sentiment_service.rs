use super::ttl_cache::TtlCache;
use crate::domain::sentiment::{MarketBuzzProvider, MarketMood, SentimentProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Gathers the market-wide sentiment inputs once per cache period.
///
/// Each source fails independently; a failed source leaves its part of the
/// mood empty and the scorer treats it as neutral.
pub struct SentimentService {
    fear_greed: Arc<dyn SentimentProvider>,
    buzz: Arc<dyn MarketBuzzProvider>,
    cache: TtlCache<(), MarketMood>,
}

impl SentimentService {
    pub fn new(
        fear_greed: Arc<dyn SentimentProvider>,
        buzz: Arc<dyn MarketBuzzProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            fear_greed,
            buzz,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn current_mood(&self) -> MarketMood {
        if let Some(mood) = self.cache.get(&()) {
            debug!("SentimentService: using cached market mood");
            return mood;
        }

        let (fear_greed, trending, mcap) = tokio::join!(
            self.fear_greed.fetch_sentiment(),
            self.buzz.fetch_trending(),
            self.buzz.fetch_market_cap_change_24h(),
        );

        let mood = MarketMood {
            fear_greed: fear_greed
                .inspect_err(|e| warn!("SentimentService: Fear & Greed unavailable: {}", e))
                .ok(),
            trending: trending
                .inspect_err(|e| warn!("SentimentService: trending list unavailable: {}", e))
                .ok(),
            market_cap_change_24h: mcap
                .inspect_err(|e| warn!("SentimentService: market cap change unavailable: {}", e))
                .ok(),
        };
        self.cache.insert((), mood.clone());
        mood
    }
}
