//! Configuration module for rustscore.
//!
//! Loaded once at startup from environment variables (with `.env` support via
//! `dotenvy` in `main`) and an optional TOML scoring file, organized by
//! concern: Exchange, Scoring, Sink, Notification and Scheduler. The core
//! never reads configuration itself; `Application::build` hands it the
//! values it needs.

mod env_source;
mod exchange_config;
mod notification_config;
mod scheduler_config;
mod scoring_config;
mod sink_config;

pub use env_source::{EnvSource, ProcessEnv};
pub use exchange_config::{ExchangeEnvConfig, Venue};
pub use notification_config::NotifierConfig;
pub use scheduler_config::SchedulerEnvConfig;
pub use scoring_config::ScoringEnvConfig;
pub use sink_config::SheetSinkConfig;

use anyhow::{Context, Result};
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub exchange: ExchangeEnvConfig,
    pub scoring: ScoringEnvConfig,
    pub sink: SheetSinkConfig,
    pub notifier: NotifierConfig,
    pub scheduler: SchedulerEnvConfig,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Self> {
        let exchange =
            ExchangeEnvConfig::from_source(env).context("Failed to load exchange configuration")?;
        let scoring = ScoringEnvConfig::from_source(env, &exchange.timeframes)
            .context("Failed to load scoring configuration")?;

        Ok(Self {
            scoring,
            sink: SheetSinkConfig::from_source(env).context("Failed to load sheet sink")?,
            notifier: NotifierConfig::from_source(env).context("Failed to load notifier")?,
            scheduler: SchedulerEnvConfig::from_source(env)
                .context("Failed to load scheduler configuration")?,
            database_url: env.get_or("DATABASE_URL", "sqlite://data/rustscore.db"),
            exchange,
        })
    }

    /// Swaps in a scoring file given on the command line.
    pub fn with_scoring_file(mut self, path: &Path) -> Result<Self> {
        self.scoring.load_file(path, &self.exchange.timeframes)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.exchange.validate()?;
        self.scheduler.validate()?;
        self.scoring.validate(&self.exchange.timeframes)?;

        // Every timeframe needs enough candles for the longest indicator window
        // to say anything.
        let lookback = self.scoring.indicator_params.longest_lookback();
        if self.exchange.candle_limit < lookback {
            tracing::warn!(
                "CANDLE_LIMIT {} is below the longest indicator window {}; the last \
                 snapshot will carry undefined values",
                self.exchange.candle_limit,
                lookback
            );
        }
        Ok(())
    }
}
