use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::application::cycle::{
    CycleDeps, CycleRunner, CycleScheduler, CycleSettings, IntervalTicker,
};
use crate::application::indicators::IndicatorEngine;
use crate::application::market_data::{
    CandleCache, MarketDataFetcher, RequestThrottle, SentimentService,
};
use crate::application::scoring::Scorer;
use crate::config::{Config, NotifierConfig, SheetSinkConfig, Venue};
use crate::domain::ports::{MarketDataService, NotificationService, SheetSink};
use crate::domain::repositories::SignalLogRepository;
use crate::infrastructure::SystemClock;
use crate::infrastructure::binance::BinanceMarketDataService;
use crate::infrastructure::coinbase::CoinbaseMarketDataService;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::notifications::{
    DiscordNotifier, LogNotifier, NullNotifier, TelegramNotifier, telegram,
};
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::persistence::{Database, SqliteSignalLogRepository};
use crate::infrastructure::sentiment::{
    AlternativeMeSentimentProvider, CoinGeckoBuzzProvider, alternative_me, coingecko,
};
use crate::infrastructure::sinks::{CsvSheetSink, GoogleSheetsSink, NullSheetSink, google_sheets};

/// Fully wired scoring service.
pub struct Application {
    pub config: Config,
    pub runner: Arc<CycleRunner>,
    pub metrics: Metrics,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building rustscore (venue: {}, symbols: {:?}, timeframes: {:?})...",
            config.exchange.venue, config.exchange.symbols, config.exchange.timeframes
        );
        let exchange = &config.exchange;
        let timeout = exchange.http_timeout;
        let retries = exchange.http_max_retries;

        // 1. Market data
        let market_service: Arc<dyn MarketDataService> = match exchange.venue {
            Venue::Coinbase => Arc::new(CoinbaseMarketDataService::new(
                exchange.coinbase_base_url.clone(),
                timeout,
                retries,
            )),
            Venue::Binance => Arc::new(BinanceMarketDataService::new(
                exchange.binance_base_url.clone(),
                timeout,
                retries,
            )),
            Venue::Mock => {
                info!("Using mock market data");
                Arc::new(MockMarketDataService::new())
            }
        };
        let fetcher = Arc::new(MarketDataFetcher::new(
            market_service,
            Arc::new(RequestThrottle::with_window(
                exchange.max_requests_per_second,
                Duration::from_secs(1),
            )),
            Arc::new(CandleCache::new(exchange.candle_cache_ttl)),
            exchange.candle_limit,
            exchange.min_candles,
        ));

        // 2. Core
        let engine = Arc::new(IndicatorEngine::new(
            config.scoring.indicator_params.clone(),
            config.scoring.indicators.clone(),
        )?);
        let scorer = Arc::new(Scorer::new(config.scoring.policy.clone()));
        info!("Enabled indicators: {}", config.scoring.indicators);

        let sentiment = config.scoring.sentiment_enabled.then(|| {
            Arc::new(SentimentService::new(
                Arc::new(AlternativeMeSentimentProvider::new(
                    alternative_me::DEFAULT_BASE_URL,
                    timeout,
                    retries,
                )),
                Arc::new(CoinGeckoBuzzProvider::new(
                    coingecko::DEFAULT_BASE_URL,
                    timeout,
                    retries,
                )),
                config.scoring.sentiment_cache_ttl,
            ))
        });

        // 3. Sinks
        let sheet: Arc<dyn SheetSink> = match &config.sink {
            SheetSinkConfig::Csv { path } => {
                info!("Writing report to {}", path.display());
                Arc::new(CsvSheetSink::new(path.clone()))
            }
            SheetSinkConfig::Google {
                sheet_id,
                access_token,
                worksheet,
            } => {
                info!("Writing report to Google sheet {} / {}", sheet_id, worksheet);
                Arc::new(GoogleSheetsSink::new(
                    google_sheets::DEFAULT_BASE_URL,
                    sheet_id.clone(),
                    worksheet.clone(),
                    access_token.clone(),
                    timeout,
                    retries,
                ))
            }
            SheetSinkConfig::None => Arc::new(NullSheetSink),
        };

        let notifier: Arc<dyn NotificationService> = match &config.notifier {
            NotifierConfig::Log => Arc::new(LogNotifier),
            NotifierConfig::Discord { webhook_url } => {
                Arc::new(DiscordNotifier::new(webhook_url.clone(), timeout, retries))
            }
            NotifierConfig::Telegram { bot_token, chat_id } => Arc::new(TelegramNotifier::new(
                telegram::DEFAULT_BASE_URL,
                bot_token.clone(),
                chat_id.clone(),
                timeout,
                retries,
            )),
            NotifierConfig::None => Arc::new(NullNotifier),
        };

        // 4. Persistence
        let db = Database::new(&config.database_url)
            .await
            .context("Failed to open signal log database")?;
        let signal_log: Arc<dyn SignalLogRepository> =
            Arc::new(SqliteSignalLogRepository::new(db.pool.clone()));

        let metrics = Metrics::new()?;
        let runner = Arc::new(CycleRunner::new(
            CycleSettings {
                symbols: exchange.symbols.clone(),
                timeframes: exchange.timeframes.clone(),
                symbol_timeout: config.scheduler.symbol_timeout,
                max_concurrent_symbols: config.scheduler.max_concurrent_symbols,
            },
            CycleDeps {
                fetcher,
                engine,
                scorer,
                sentiment,
                sheet,
                notifier,
                signal_log,
                clock: Arc::new(SystemClock),
                metrics: metrics.clone(),
            },
        ));

        Ok(Self {
            config,
            runner,
            metrics,
        })
    }

    /// Scheduler on the configured poll interval. Returns when `stop` flips.
    pub fn scheduler(&self, stop: watch::Receiver<bool>) -> CycleScheduler {
        CycleScheduler::new(
            self.runner.clone(),
            Box::new(IntervalTicker::new(self.config.scheduler.poll_interval)),
            stop,
        )
    }
}
