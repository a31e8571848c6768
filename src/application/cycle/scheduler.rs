use super::runner::CycleRunner;
use crate::domain::ports::Ticker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Fixed-period ticker backed by `tokio::time::interval`.
///
/// The first tick fires one period after creation: the scheduler has already
/// run its immediate cycle by then.
pub struct IntervalTicker {
    interval: tokio::time::Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        // A slow cycle pushes the next one back instead of bunching them up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Runs a cycle at start, then once per tick until stopped.
pub struct CycleScheduler {
    runner: Arc<CycleRunner>,
    ticker: Box<dyn Ticker>,
    stop: watch::Receiver<bool>,
}

impl CycleScheduler {
    pub fn new(runner: Arc<CycleRunner>, ticker: Box<dyn Ticker>, stop: watch::Receiver<bool>) -> Self {
        Self {
            runner,
            ticker,
            stop,
        }
    }

    /// Returns the number of cycles run. Ends when the stop signal flips to
    /// `true`, its sender is dropped, or the ticker runs dry. A cycle in
    /// progress is always finished first.
    pub async fn run(mut self) -> usize {
        let mut cycles = 0;
        info!("CycleScheduler: started");

        loop {
            if *self.stop.borrow() {
                break;
            }

            self.run_one().await;
            cycles += 1;

            tokio::select! {
                more = self.ticker.tick() => {
                    if !more {
                        info!("CycleScheduler: ticker finished");
                        break;
                    }
                }
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        warn!("CycleScheduler: stop signal dropped, shutting down");
                    }
                    break;
                }
            }
        }

        info!("CycleScheduler: stopped after {} cycles", cycles);
        cycles
    }

    async fn run_one(&self) {
        let report = self.runner.run_cycle().await;
        if !report.skipped.is_empty() {
            let names: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
            warn!("CycleScheduler: skipped this cycle: {}", names.join(", "));
        }
        debug!("CycleScheduler: metrics\n{}", self.runner.metrics().render());
    }
}
