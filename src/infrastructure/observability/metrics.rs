//! Prometheus metrics definitions for rustscore
//!
//! All metrics use the `rustscore_` prefix. They are never served; the
//! scheduler logs the text rendering after each cycle.

use prometheus::{
    CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter, Opts, Registry,
    TextEncoder,
    core::{AtomicF64, GenericGauge, GenericGaugeVec},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Completed polling cycles
    pub cycles_total: IntCounter,
    /// Wall time of a cycle in seconds
    pub cycle_duration_seconds: Histogram,
    /// Per-symbol outcomes by venue ("ok", "failed", "timeout")
    pub symbol_fetch_total: CounterVec,
    /// Sheet writes by sink and outcome
    pub sheet_writes_total: CounterVec,
    /// Alerts by notifier and outcome
    pub alerts_total: CounterVec,
    /// Latest score per symbol (0-10)
    pub symbol_score: GenericGaugeVec<AtomicF64>,
    /// Latest Fear & Greed index
    pub fear_greed_index: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles_total = IntCounter::with_opts(Opts::new(
            "rustscore_cycles_total",
            "Completed polling cycles",
        ))?;
        registry.register(Box::new(cycles_total.clone()))?;

        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "rustscore_cycle_duration_seconds",
                "Wall time of one polling cycle",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        let symbol_fetch_total = CounterVec::new(
            Opts::new(
                "rustscore_symbol_fetch_total",
                "Symbol analyses by venue and outcome",
            ),
            &["venue", "outcome"],
        )?;
        registry.register(Box::new(symbol_fetch_total.clone()))?;

        let sheet_writes_total = CounterVec::new(
            Opts::new("rustscore_sheet_writes_total", "Report writes by sink and outcome"),
            &["sink", "outcome"],
        )?;
        registry.register(Box::new(sheet_writes_total.clone()))?;

        let alerts_total = CounterVec::new(
            Opts::new("rustscore_alerts_total", "Alerts by notifier and outcome"),
            &["notifier", "outcome"],
        )?;
        registry.register(Box::new(alerts_total.clone()))?;

        let symbol_score = GaugeVec::new(
            Opts::new("rustscore_symbol_score", "Latest global score per symbol"),
            &["symbol"],
        )?;
        registry.register(Box::new(symbol_score.clone()))?;

        let fear_greed_index = Gauge::with_opts(Opts::new(
            "rustscore_fear_greed_index",
            "Latest Fear & Greed index reading",
        ))?;
        registry.register(Box::new(fear_greed_index.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            cycles_total,
            cycle_duration_seconds,
            symbol_fetch_total,
            sheet_writes_total,
            alerts_total,
            symbol_score,
            fear_greed_index,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_symbol_fetch(&self, venue: &str, outcome: &str) {
        self.symbol_fetch_total
            .with_label_values(&[venue, outcome])
            .inc();
    }

    pub fn inc_sheet_write(&self, sink: &str, outcome: &str) {
        self.sheet_writes_total
            .with_label_values(&[sink, outcome])
            .inc();
    }

    pub fn inc_alert(&self, notifier: &str, outcome: &str) {
        self.alerts_total
            .with_label_values(&[notifier, outcome])
            .inc();
    }

    pub fn set_symbol_score(&self, symbol: &str, score: f64) {
        self.symbol_score.with_label_values(&[symbol]).set(score);
    }
}
