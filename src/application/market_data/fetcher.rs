use super::request_throttle::RequestThrottle;
use super::ttl_cache::TtlCache;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{Series, Timeframe};
use crate::domain::ports::MarketDataService;
use crate::domain::validation::StrictCandleValidator;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub type CandleCache = TtlCache<(String, Timeframe), Series>;

/// Fetches validated, ordered candle series through the shared throttle and cache.
pub struct MarketDataFetcher {
    service: Arc<dyn MarketDataService>,
    throttle: Arc<RequestThrottle>,
    cache: Arc<CandleCache>,
    candle_limit: usize,
    min_candles: usize,
}

impl MarketDataFetcher {
    pub fn new(
        service: Arc<dyn MarketDataService>,
        throttle: Arc<RequestThrottle>,
        cache: Arc<CandleCache>,
        candle_limit: usize,
        min_candles: usize,
    ) -> Self {
        Self {
            service,
            throttle,
            cache,
            candle_limit,
            min_candles,
        }
    }

    pub fn venue(&self) -> &str {
        self.service.name()
    }

    /// One timeframe of `symbol`. Fails with
    /// [`MarketDataError::InsufficientHistory`] when fewer than `min_candles`
    /// valid candles come back.
    pub async fn fetch_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Series> {
        let key = (symbol.to_string(), timeframe);
        if let Some(series) = self.cache.get(&key) {
            debug!("MarketDataFetcher: cache hit for {} {}", symbol, timeframe);
            return Ok(series);
        }

        self.throttle.acquire().await;
        let candles = match self
            .service
            .fetch_candles(symbol, timeframe, self.candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                if let Some(MarketDataError::RateLimitExceeded { retry_after_secs }) =
                    e.downcast_ref::<MarketDataError>()
                {
                    self.throttle
                        .penalize(Duration::from_secs(*retry_after_secs))
                        .await;
                }
                return Err(e).with_context(|| {
                    format!(
                        "Failed to fetch {} {} candles from {}",
                        symbol,
                        timeframe,
                        self.service.name()
                    )
                });
            }
        };

        let candles = StrictCandleValidator::retain_valid(symbol, candles);
        let series = Series::new(symbol, timeframe, candles);
        let gaps = series.gap_count();
        if gaps > 0 {
            debug!("MarketDataFetcher: {} {} has {} gap(s)", symbol, timeframe, gaps);
        }
        if series.len() < self.min_candles {
            return Err(MarketDataError::InsufficientHistory {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                available: series.len(),
                required: self.min_candles,
            }
            .into());
        }

        self.cache.insert(key, series.clone());
        Ok(series)
    }

    /// Every requested timeframe of `symbol`.
    ///
    /// A timeframe with too little history is left out; any other failure
    /// aborts the symbol. Fails when no timeframe is left.
    pub async fn fetch_timeframes(
        &self,
        symbol: &str,
        timeframes: &[Timeframe],
    ) -> Result<BTreeMap<Timeframe, Series>> {
        let mut out = BTreeMap::new();
        for &timeframe in timeframes {
            match self.fetch_series(symbol, timeframe).await {
                Ok(series) => {
                    out.insert(timeframe, series);
                }
                Err(e)
                    if matches!(
                        e.downcast_ref::<MarketDataError>(),
                        Some(MarketDataError::InsufficientHistory { .. })
                    ) =>
                {
                    warn!("MarketDataFetcher: skipping timeframe: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        if out.is_empty() {
            anyhow::bail!("No usable timeframe for {}", symbol);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockMarketDataService;

    fn fetcher(service: Arc<MockMarketDataService>, min_candles: usize) -> MarketDataFetcher {
        MarketDataFetcher::new(
            service,
            Arc::new(RequestThrottle::new(100)),
            Arc::new(CandleCache::new(Duration::from_secs(60))),
            300,
            min_candles,
        )
    }

    #[tokio::test]
    async fn test_fetch_series_normalises_and_caches() {
        let service = Arc::new(MockMarketDataService::new());
        service.set_flat("BTC-USD", 100.0, 80);
        let f = fetcher(service.clone(), 60);

        let series = f.fetch_series("BTC-USD", Timeframe::OneHour).await.unwrap();
        assert_eq!(series.len(), 80);
        assert!(series.candles().windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        f.fetch_series("BTC-USD", Timeframe::OneHour).await.unwrap();
        assert_eq!(service.call_count("BTC-USD"), 1);
    }

    #[tokio::test]
    async fn test_short_history_skips_timeframe_only() {
        let service = Arc::new(MockMarketDataService::new());
        service.set_flat("ETH-USD", 2000.0, 30);
        let f = fetcher(service, 60);

        let err = f.fetch_series("ETH-USD", Timeframe::OneDay).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MarketDataError>(),
            Some(MarketDataError::InsufficientHistory { available: 30, .. })
        ));
        assert!(f
            .fetch_timeframes("ETH-USD", &[Timeframe::OneHour, Timeframe::OneDay])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_request_failure_keeps_typed_error() {
        let service = Arc::new(MockMarketDataService::new());
        service.fail_with_status("SOL-USD", 500);
        let f = fetcher(service, 60);

        let err = f
            .fetch_timeframes("SOL-USD", &[Timeframe::OneHour])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MarketDataError>(),
            Some(MarketDataError::RequestFailed { status: 500, .. })
        ));
    }
}
