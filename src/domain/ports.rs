use crate::domain::alert::Alert;
use crate::domain::market::{Candle, Timeframe};
use crate::domain::report::ReportTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Venue name used in logs and metrics.
    fn name(&self) -> &str;

    /// Up to `limit` most recent candles, in any order. Callers normalise
    /// through [`crate::domain::market::Series`].
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>>;
}

/// Destination of the per-cycle report. Each write replaces the previous table.
#[async_trait]
pub trait SheetSink: Send + Sync {
    fn name(&self) -> &str;

    async fn replace_table(&self, table: &ReportTable) -> Result<()>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, alert: &Alert) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of scheduling ticks.
#[async_trait]
pub trait Ticker: Send + Sync {
    /// Waits for the next tick. Returns `false` once no more ticks will come.
    async fn tick(&mut self) -> bool;
}
