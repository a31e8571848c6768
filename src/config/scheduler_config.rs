//! Polling cadence and per-symbol budget.

use super::env_source::EnvSource;
use crate::domain::errors::ConfigError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SchedulerEnvConfig {
    pub poll_interval: Duration,
    pub symbol_timeout: Duration,
    pub max_concurrent_symbols: usize,
}

impl Default for SchedulerEnvConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3600),
            symbol_timeout: Duration::from_secs(15),
            max_concurrent_symbols: 3,
        }
    }
}

impl SchedulerEnvConfig {
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            poll_interval: Duration::from_secs(env.parse_or("POLL_INTERVAL_SECS", 3600)?),
            symbol_timeout: Duration::from_secs(env.parse_or("SYMBOL_TIMEOUT_SECS", 15)?),
            max_concurrent_symbols: env.parse_or("MAX_CONCURRENT_SYMBOLS", 3)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("POLL_INTERVAL_SECS", self.poll_interval.as_secs()),
            ("SYMBOL_TIMEOUT_SECS", self.symbol_timeout.as_secs()),
            ("MAX_CONCURRENT_SYMBOLS", self.max_concurrent_symbols as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    reason: "must be > 0".to_string(),
                });
            }
        }
        Ok(())
    }
}
