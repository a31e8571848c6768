//! Indicator selection, sentiment switches and the optional scoring file.
//!
//! The TOML file holds the scoring policy at the top level and indicator
//! periods under `[indicators]`:
//!
//! ```toml
//! macd_epsilon = 0.000001
//!
//! [weights]
//! trend = 0.30
//! macd = 0.25
//! rsi = 0.15
//! bollinger = 0.10
//! volume = 0.10
//! sentiment = 0.10
//!
//! [timeframe_weights]
//! 1h = 0.2
//! 6h = 0.3
//! 1d = 0.5
//!
//! [thresholds]
//! strong_buy = 8.0
//!
//! [indicators]
//! rsi_period = 14
//! ```

use super::env_source::EnvSource;
use crate::application::indicators::{EnabledIndicators, IndicatorParams};
use crate::domain::analysis::{ScoringPolicy, TimeframeWeights};
use crate::domain::errors::ConfigError;
use crate::domain::market::Timeframe;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndicatorSection {
    indicators: IndicatorParams,
}

/// Scoring environment configuration
#[derive(Debug, Clone)]
pub struct ScoringEnvConfig {
    pub config_path: Option<PathBuf>,
    pub policy: ScoringPolicy,
    pub indicator_params: IndicatorParams,
    pub indicators: EnabledIndicators,
    pub sentiment_enabled: bool,
    pub sentiment_cache_ttl: Duration,
}

impl ScoringEnvConfig {
    /// Reads the environment and, when `SCORING_CONFIG_PATH` is set, the file
    /// it names. Timeframe weights not given by a file follow `timeframes`.
    pub fn from_source(env: &dyn EnvSource, timeframes: &[Timeframe]) -> Result<Self> {
        let indicators = env
            .get_or("INDICATORS", "all")
            .parse::<EnabledIndicators>()
            .map_err(|e| ConfigError::Invalid {
                key: "INDICATORS".to_string(),
                reason: e.to_string(),
            })?;

        let mut config = Self {
            config_path: None,
            policy: ScoringPolicy {
                timeframe_weights: default_timeframe_weights(timeframes),
                ..ScoringPolicy::default()
            },
            indicator_params: IndicatorParams::default(),
            indicators,
            sentiment_enabled: env.parse_or("SENTIMENT_ENABLED", true)?,
            sentiment_cache_ttl: Duration::from_secs(env.parse_or("SENTIMENT_CACHE_TTL_SECS", 600)?),
        };

        if let Some(path) = env.get("SCORING_CONFIG_PATH") {
            config.load_file(Path::new(&path), timeframes)?;
        }
        Ok(config)
    }

    /// Replaces policy and indicator periods with the contents of a TOML file.
    pub fn load_file(&mut self, path: &Path, timeframes: &[Timeframe]) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config {}", path.display()))?;
        self.apply_toml(&text, timeframes)
            .with_context(|| format!("Invalid scoring config {}", path.display()))?;
        self.config_path = Some(path.to_path_buf());
        info!("Loaded scoring config from {}", path.display());
        Ok(())
    }

    pub fn apply_toml(&mut self, text: &str, timeframes: &[Timeframe]) -> Result<()> {
        let table: toml::Table = toml::from_str(text).context("Malformed TOML")?;
        let mut policy: ScoringPolicy = toml::from_str(text)?;
        if !table.contains_key("timeframe_weights") {
            policy.timeframe_weights = default_timeframe_weights(timeframes);
        }
        let section: IndicatorSection = toml::from_str(text)?;

        self.policy = policy;
        self.indicator_params = section.indicators;
        Ok(())
    }

    pub fn validate(&self, timeframes: &[Timeframe]) -> Result<()> {
        self.policy.validate()?;
        if let Some(tf) = self
            .policy
            .timeframe_weights
            .timeframes()
            .find(|tf| !timeframes.contains(tf))
        {
            return Err(ConfigError::Invalid {
                key: "timeframe_weights".to_string(),
                reason: format!("{} is weighted but not listed in TIMEFRAMES", tf),
            }
            .into());
        }
        self.indicator_params
            .validate()
            .context("Invalid [indicators] section")?;
        Ok(())
    }
}

/// The documented 1h/6h/1d split when those are the timeframes, otherwise
/// weight proportional to timeframe duration.
fn default_timeframe_weights(timeframes: &[Timeframe]) -> TimeframeWeights {
    let defaults = TimeframeWeights::default();
    let mut configured = timeframes.to_vec();
    configured.sort();
    if defaults.timeframes().eq(configured.iter().copied()) {
        defaults
    } else {
        TimeframeWeights::proportional(timeframes)
    }
}
