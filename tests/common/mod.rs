#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use rustscore::application::cycle::{CycleDeps, CycleRunner, CycleSettings};
use rustscore::application::indicators::{EnabledIndicators, IndicatorEngine, IndicatorParams};
use rustscore::application::market_data::{
    CandleCache, MarketDataFetcher, RequestThrottle, SentimentService,
};
use rustscore::application::scoring::Scorer;
use rustscore::domain::analysis::{ScoringPolicy, TimeframeWeights};
use rustscore::domain::market::Timeframe;
use rustscore::domain::ports::SheetSink;
use rustscore::infrastructure::InMemorySignalLogRepository;
use rustscore::infrastructure::mock::{
    FixedClock, MockMarketDataService, RecordingNotifier, RecordingSheetSink,
};
use rustscore::infrastructure::observability::Metrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const TIMEFRAMES: [Timeframe; 2] = [Timeframe::OneHour, Timeframe::OneDay];

/// Closes growing 1% per candle.
pub fn rising(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 * 1.01f64.powi(i as i32)).collect()
}

/// Accelerating decline from 500, so MACD stays under its signal.
pub fn falling(count: usize) -> Vec<f64> {
    (0..count).map(|i| 500.0 - 0.004 * (i * i) as f64).collect()
}

pub struct Harness {
    pub market: MockMarketDataService,
    pub sheet: Arc<RecordingSheetSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub signal_log: Arc<InMemorySignalLogRepository>,
    pub metrics: Metrics,
    pub runner: Arc<CycleRunner>,
}

pub struct HarnessOptions {
    pub symbols: Vec<&'static str>,
    pub symbol_timeout: Duration,
    pub failing_sheet: bool,
    pub sentiment: Option<Arc<SentimentService>>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            symbols: vec!["BTC-USD", "ETH-USD", "SOL-USD"],
            symbol_timeout: Duration::from_secs(15),
            failing_sheet: false,
            sentiment: None,
        }
    }
}

pub fn harness(options: HarnessOptions) -> Harness {
    let market = MockMarketDataService::new();
    let sheet = Arc::new(if options.failing_sheet {
        RecordingSheetSink::failing()
    } else {
        RecordingSheetSink::new()
    });
    let notifier = Arc::new(RecordingNotifier::new());
    let signal_log = Arc::new(InMemorySignalLogRepository::new());
    let metrics = Metrics::new().unwrap();

    let fetcher = Arc::new(MarketDataFetcher::new(
        Arc::new(market.clone()),
        Arc::new(RequestThrottle::with_window(1000, Duration::from_secs(1))),
        Arc::new(CandleCache::new(Duration::ZERO)),
        300,
        60,
    ));

    let mut weights = BTreeMap::new();
    weights.insert(Timeframe::OneHour, 0.5);
    weights.insert(Timeframe::OneDay, 0.5);
    let policy = ScoringPolicy {
        timeframe_weights: TimeframeWeights::new(weights),
        ..ScoringPolicy::default()
    };

    let runner = Arc::new(CycleRunner::new(
        CycleSettings {
            symbols: options.symbols.iter().map(|s| s.to_string()).collect(),
            timeframes: TIMEFRAMES.to_vec(),
            symbol_timeout: options.symbol_timeout,
            max_concurrent_symbols: 3,
        },
        CycleDeps {
            fetcher,
            engine: Arc::new(
                IndicatorEngine::new(IndicatorParams::default(), EnabledIndicators::all()).unwrap(),
            ),
            scorer: Arc::new(Scorer::new(policy)),
            sentiment: options.sentiment,
            sheet: sheet.clone() as Arc<dyn SheetSink>,
            notifier: notifier.clone(),
            signal_log: signal_log.clone(),
            clock: Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            )),
            metrics: metrics.clone(),
        },
    ));

    Harness {
        market,
        sheet,
        notifier,
        signal_log,
        metrics,
        runner,
    }
}
