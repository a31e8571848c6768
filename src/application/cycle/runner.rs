use crate::application::indicators::IndicatorEngine;
use crate::application::market_data::{MarketDataFetcher, SentimentService};
use crate::application::report::build_table;
use crate::application::scoring::{AlertDecision, AlertPolicy, Scorer, rationale};
use crate::domain::alert::Alert;
use crate::domain::errors::MarketDataError;
use crate::domain::market::Timeframe;
use crate::domain::ports::{Clock, NotificationService, SheetSink};
use crate::domain::report::{ReportTable, SymbolReport};
use crate::domain::repositories::{SignalLogEntry, SignalLogRepository};
use crate::domain::sentiment::MarketMood;
use crate::infrastructure::observability::Metrics;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a cycle works on.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub symbols: Vec<String>,
    pub timeframes: Vec<Timeframe>,
    pub symbol_timeout: Duration,
    pub max_concurrent_symbols: usize,
}

/// A symbol left out of this cycle's table.
#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of one polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub reports: Vec<SymbolReport>,
    pub skipped: Vec<SkippedSymbol>,
    pub table: ReportTable,
    pub sheet_written: bool,
    pub alerts_sent: Vec<Alert>,
}

/// Collaborators of the cycle runner.
pub struct CycleDeps {
    pub fetcher: Arc<MarketDataFetcher>,
    pub engine: Arc<IndicatorEngine>,
    pub scorer: Arc<Scorer>,
    pub sentiment: Option<Arc<SentimentService>>,
    pub sheet: Arc<dyn SheetSink>,
    pub notifier: Arc<dyn NotificationService>,
    pub signal_log: Arc<dyn SignalLogRepository>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Metrics,
}

/// Fetch → compute → score → write → alert, once.
pub struct CycleRunner {
    settings: CycleSettings,
    deps: CycleDeps,
    alert_policy: AlertPolicy,
}

impl CycleRunner {
    pub fn new(settings: CycleSettings, deps: CycleDeps) -> Self {
        Self {
            settings,
            deps,
            alert_policy: AlertPolicy,
        }
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Metrics {
        &self.deps.metrics
    }

    /// Runs one cycle. Per-symbol and sink failures are logged and reported
    /// in the returned [`CycleReport`]; they never abort the cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = std::time::Instant::now();
        let started_at = self.deps.clock.now();
        info!(
            "CycleRunner: starting cycle for {} symbols on {:?}",
            self.settings.symbols.len(),
            self.settings.timeframes
        );

        let mood = match &self.deps.sentiment {
            Some(service) => service.current_mood().await,
            None => MarketMood::default(),
        };
        if let Some(fg) = &mood.fear_greed {
            self.deps.metrics.fear_greed_index.set(fg.value as f64);
        }

        let this = self;
        let shared_mood = &mood;
        let mut results: Vec<(usize, String, Result<SymbolReport>)> =
            stream::iter(self.settings.symbols.iter().cloned().enumerate())
                .map(move |(index, symbol)| async move {
                    let result = this.analyze_with_timeout(&symbol, shared_mood).await;
                    (index, symbol, result)
                })
                .buffer_unordered(self.settings.max_concurrent_symbols.max(1))
                .collect()
                .await;
        results.sort_by_key(|(index, _, _)| *index);

        let venue = self.deps.fetcher.venue().to_string();
        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        for (_, symbol, result) in results {
            match result {
                Ok(report) => {
                    self.deps.metrics.inc_symbol_fetch(&venue, "ok");
                    self.deps.metrics.set_symbol_score(&symbol, report.score.value);
                    info!(
                        "CycleRunner: {} score {:.1} ({}) consensus {}",
                        symbol, report.score.value, report.score.label, report.consensus
                    );
                    reports.push(report);
                }
                Err(e) => {
                    let market_error = e.downcast_ref::<MarketDataError>();
                    let outcome = match market_error {
                        Some(MarketDataError::Timeout { .. }) => "timeout",
                        _ => "failed",
                    };
                    self.deps.metrics.inc_symbol_fetch(&venue, outcome);
                    if market_error.is_some_and(|m| m.is_transient()) {
                        warn!("CycleRunner: {} unavailable, retrying next cycle: {:#}", symbol, e);
                    } else {
                        warn!("CycleRunner: skipping {} this cycle: {:#}", symbol, e);
                    }
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        let table = build_table(&reports, &self.settings.timeframes);
        let sheet_written = self.write_table(&table).await;
        let alerts_sent = self.dispatch_alerts(&reports).await;

        self.deps.metrics.cycles_total.inc();
        self.deps
            .metrics
            .cycle_duration_seconds
            .observe(started.elapsed().as_secs_f64());
        info!(
            "CycleRunner: cycle done in {:?}: {} rows, {} skipped, {} alerts",
            started.elapsed(),
            reports.len(),
            skipped.len(),
            alerts_sent.len()
        );

        CycleReport {
            started_at,
            reports,
            skipped,
            table,
            sheet_written,
            alerts_sent,
        }
    }

    async fn analyze_with_timeout(&self, symbol: &str, mood: &MarketMood) -> Result<SymbolReport> {
        match tokio::time::timeout(self.settings.symbol_timeout, self.analyze_symbol(symbol, mood))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                duration_ms: self.settings.symbol_timeout.as_millis() as u64,
            }
            .into()),
        }
    }

    async fn analyze_symbol(&self, symbol: &str, mood: &MarketMood) -> Result<SymbolReport> {
        let series = self
            .deps
            .fetcher
            .fetch_timeframes(symbol, &self.settings.timeframes)
            .await?;

        let snapshots: BTreeMap<Timeframe, _> = series
            .iter()
            .filter_map(|(tf, s)| self.deps.engine.snapshot(s).map(|snap| (*tf, snap)))
            .collect();

        // Shortest timeframe carries the freshest close.
        let price = series
            .values()
            .next()
            .and_then(|s| s.last())
            .map(|c| c.close)
            .unwrap_or(f64::NAN);

        let sentiment = mood.for_symbol(symbol);
        let score = self.deps.scorer.score(&snapshots, sentiment.score);
        let consensus = self.deps.scorer.consensus(&snapshots);
        debug!("CycleRunner: {} breakdown {:?}", symbol, score.breakdown);

        Ok(SymbolReport {
            symbol: symbol.to_string(),
            price,
            score,
            consensus,
            snapshots,
            sentiment,
            updated_at: self.deps.clock.now(),
        })
    }

    /// One batched write. An empty table leaves the previous sheet in place.
    async fn write_table(&self, table: &ReportTable) -> bool {
        let sink = self.deps.sheet.name().to_string();
        if table.is_empty() {
            warn!("CycleRunner: no symbol produced data, sheet left unchanged");
            return false;
        }
        match self.deps.sheet.replace_table(table).await {
            Ok(()) => {
                self.deps.metrics.inc_sheet_write(&sink, "ok");
                info!("CycleRunner: wrote {} rows to {} sink", table.rows.len(), sink);
                true
            }
            Err(e) => {
                self.deps.metrics.inc_sheet_write(&sink, "failed");
                warn!("CycleRunner: {} sink write failed: {:#}", sink, e);
                false
            }
        }
    }

    async fn dispatch_alerts(&self, reports: &[SymbolReport]) -> Vec<Alert> {
        let notifier = self.deps.notifier.name().to_string();
        let mut sent = Vec::new();

        for report in reports {
            let last = match self.deps.signal_log.last_for_symbol(&report.symbol).await {
                Ok(entry) => entry.map(|e| e.signal),
                Err(e) => {
                    warn!(
                        "CycleRunner: signal log unavailable for {}, skipping alert: {:#}",
                        report.symbol, e
                    );
                    continue;
                }
            };

            let AlertDecision::Notify { previous } =
                self.alert_policy.evaluate(last, report.score.label)
            else {
                continue;
            };

            let alert = Alert {
                symbol: report.symbol.clone(),
                signal: report.score.label,
                previous,
                price: report.price,
                score: report.score.value,
                rationale: rationale(&report.score),
                raised_at: self.deps.clock.now(),
            };

            if let Err(e) = self.deps.notifier.notify(&alert).await {
                self.deps.metrics.inc_alert(&notifier, "failed");
                warn!("CycleRunner: {} notification for {} failed: {:#}", notifier, alert.symbol, e);
                continue;
            }
            self.deps.metrics.inc_alert(&notifier, "sent");

            let entry = SignalLogEntry {
                logged_at: alert.raised_at,
                symbol: alert.symbol.clone(),
                signal: alert.signal,
                score: alert.score,
                reason: alert.rationale.clone(),
            };
            if let Err(e) = self.deps.signal_log.append(&entry).await {
                warn!("CycleRunner: failed to log signal for {}: {:#}", entry.symbol, e);
            }
            sent.push(alert);
        }
        sent
    }
}
