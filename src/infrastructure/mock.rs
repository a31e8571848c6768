//! In-process stand-ins for the external collaborators.
//!
//! `MockMarketDataService` doubles as the `VENUE=mock` data source: symbols
//! without a script get a deterministic synthetic series.

use crate::domain::alert::Alert;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, Timeframe};
use crate::domain::ports::{Clock, MarketDataService, NotificationService, SheetSink, Ticker};
use crate::domain::report::ReportTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What the mock venue answers for one symbol.
#[derive(Debug, Clone)]
pub enum CandleScript {
    /// Closes oldest first; each candle opens at the previous close.
    Closes(Vec<f64>),
    /// Every candle has open = high = low = close.
    Flat { price: f64, count: usize },
    Candles(Vec<Candle>),
    FailStatus(u16),
    RateLimited { retry_after_secs: u64 },
    /// Never answers.
    Hang,
}

#[derive(Clone)]
pub struct MockMarketDataService {
    scripts: Arc<Mutex<HashMap<String, CandleScript>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    end: DateTime<Utc>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(HashMap::new())),
            end: Utc
                .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    pub fn script(&self, symbol: &str, script: CandleScript) {
        lock(&self.scripts).insert(symbol.to_string(), script);
    }

    pub fn set_closes(&self, symbol: &str, closes: Vec<f64>) {
        self.script(symbol, CandleScript::Closes(closes));
    }

    pub fn set_flat(&self, symbol: &str, price: f64, count: usize) {
        self.script(symbol, CandleScript::Flat { price, count });
    }

    pub fn fail_with_status(&self, symbol: &str, status: u16) {
        self.script(symbol, CandleScript::FailStatus(status));
    }

    pub fn call_count(&self, symbol: &str) -> usize {
        lock(&self.calls).get(symbol).copied().unwrap_or(0)
    }

    /// Candles ending at a fixed instant, spaced by the timeframe.
    fn build(&self, closes: &[f64], timeframe: Timeframe, flat: bool) -> Vec<Candle> {
        let step = Duration::seconds(timeframe.to_seconds());
        let n = closes.len() as i32;
        let mut prev_close = closes.first().copied().unwrap_or(0.0);
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let ts = self.end - step * (n - i as i32);
                let open = if flat { close } else { prev_close };
                prev_close = close;
                let (high, low) = if flat {
                    (close, close)
                } else {
                    (open.max(close) * 1.002, open.min(close) * 0.998)
                };
                Candle::new(ts, open, high, low, close, 100.0)
            })
            .collect()
    }

    /// Deterministic wave seeded by the symbol name.
    fn synthetic(symbol: &str, count: usize) -> Vec<f64> {
        let seed = symbol.bytes().map(|b| b as f64).sum::<f64>();
        let base = 50.0 + seed % 500.0;
        (0..count)
            .map(|i| {
                let x = i as f64;
                base * (1.0 + 0.05 * (x / 9.0 + seed).sin() + 0.02 * (x / 31.0).cos())
            })
            .collect()
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        *lock(&self.calls).entry(symbol.to_string()).or_insert(0) += 1;
        let script = lock(&self.scripts).get(symbol).cloned();

        let mut candles = match script {
            None => self.build(&Self::synthetic(symbol, limit), timeframe, false),
            Some(CandleScript::Closes(closes)) => self.build(&closes, timeframe, false),
            Some(CandleScript::Flat { price, count }) => {
                self.build(&vec![price; count], timeframe, true)
            }
            Some(CandleScript::Candles(candles)) => candles,
            Some(CandleScript::FailStatus(status)) => {
                return Err(MarketDataError::RequestFailed {
                    symbol: symbol.to_string(),
                    status,
                }
                .into());
            }
            Some(CandleScript::RateLimited { retry_after_secs }) => {
                return Err(MarketDataError::RateLimitExceeded { retry_after_secs }.into());
            }
            Some(CandleScript::Hang) => {
                std::future::pending::<()>().await;
                Vec::new()
            }
        };

        // Venues answer newest first.
        candles.reverse();
        candles.truncate(limit);
        Ok(candles)
    }
}

/// Ticker driven by a channel; `tick` returns false once every sender is dropped.
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTickHandle {
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl ManualTicker {
    pub fn new() -> (Self, ManualTickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ManualTickHandle { tx })
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// Keeps every table written to it.
#[derive(Default)]
pub struct RecordingSheetSink {
    tables: Mutex<Vec<ReportTable>>,
    fail: bool,
}

impl RecordingSheetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose writes always fail.
    pub fn failing() -> Self {
        Self {
            tables: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn tables(&self) -> Vec<ReportTable> {
        lock(&self.tables).clone()
    }

    pub fn last(&self) -> Option<ReportTable> {
        lock(&self.tables).last().cloned()
    }
}

#[async_trait]
impl SheetSink for RecordingSheetSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn replace_table(&self, table: &ReportTable) -> Result<()> {
        if self.fail {
            anyhow::bail!("recording sink configured to fail");
        }
        lock(&self.tables).push(table.clone());
        Ok(())
    }
}

/// Keeps every alert sent to it.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        lock(&self.alerts).clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, alert: &Alert) -> Result<()> {
        lock(&self.alerts).push(alert.clone());
        Ok(())
    }
}
