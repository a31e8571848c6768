//! Market data venue configuration parsing from environment variables.

use super::env_source::{EnvSource, split_list};
use crate::domain::errors::ConfigError;
use crate::domain::market::Timeframe;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Where candles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Coinbase,
    Binance,
    Mock,
}

impl FromStr for Venue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coinbase" => Ok(Venue::Coinbase),
            "binance" => Ok(Venue::Binance),
            "mock" => Ok(Venue::Mock),
            _ => anyhow::bail!(
                "Invalid VENUE: {}. Must be 'coinbase', 'binance' or 'mock'",
                s
            ),
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Coinbase => write!(f, "coinbase"),
            Venue::Binance => write!(f, "binance"),
            Venue::Mock => write!(f, "mock"),
        }
    }
}

/// Exchange environment configuration
#[derive(Debug, Clone)]
pub struct ExchangeEnvConfig {
    pub venue: Venue,
    pub coinbase_base_url: String,
    pub binance_base_url: String,
    pub symbols: Vec<String>,
    pub timeframes: Vec<Timeframe>,
    pub candle_limit: usize,
    pub min_candles: usize,
    pub http_timeout: Duration,
    pub http_max_retries: u32,
    pub max_requests_per_second: usize,
    pub candle_cache_ttl: Duration,
}

impl ExchangeEnvConfig {
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let timeframes = split_list(&env.get_or("TIMEFRAMES", "1h,6h,1d"))
            .iter()
            .map(|s| {
                s.parse::<Timeframe>().map_err(|e| ConfigError::Invalid {
                    key: "TIMEFRAMES".to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            venue: env.parse_or("VENUE", Venue::Coinbase)?,
            coinbase_base_url: env.get_or("COINBASE_BASE_URL", "https://api.exchange.coinbase.com"),
            binance_base_url: env.get_or("BINANCE_BASE_URL", "https://api.binance.com"),
            symbols: split_list(&env.get_or("SYMBOLS", "BTC-USD,ETH-USD,SOL-USD")),
            timeframes,
            candle_limit: env.parse_or("CANDLE_LIMIT", 300)?,
            min_candles: env.parse_or("MIN_CANDLES", 60)?,
            http_timeout: Duration::from_secs(env.parse_or("HTTP_TIMEOUT_SECS", 12)?),
            http_max_retries: env.parse_or("HTTP_MAX_RETRIES", 2)?,
            max_requests_per_second: env.parse_or("MAX_REQUESTS_PER_SECOND", 5)?,
            candle_cache_ttl: Duration::from_secs(env.parse_or("CANDLE_CACHE_TTL_SECS", 60)?),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: String| ConfigError::Invalid {
            key: key.to_string(),
            reason,
        };
        if self.symbols.is_empty() {
            return Err(invalid("SYMBOLS", "watchlist is empty".to_string()));
        }
        if self.timeframes.is_empty() {
            return Err(invalid("TIMEFRAMES", "no timeframe configured".to_string()));
        }
        let mut sorted = self.timeframes.clone();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != self.timeframes.len() {
            return Err(invalid("TIMEFRAMES", "duplicate timeframe".to_string()));
        }
        if self.candle_limit == 0 {
            return Err(invalid("CANDLE_LIMIT", "must be > 0".to_string()));
        }
        if self.min_candles > self.candle_limit {
            return Err(invalid(
                "MIN_CANDLES",
                format!(
                    "{} exceeds CANDLE_LIMIT {}",
                    self.min_candles, self.candle_limit
                ),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(invalid("HTTP_TIMEOUT_SECS", "must be > 0".to_string()));
        }
        if self.max_requests_per_second == 0 {
            return Err(invalid("MAX_REQUESTS_PER_SECOND", "must be > 0".to_string()));
        }
        for (key, url) in [
            ("COINBASE_BASE_URL", &self.coinbase_base_url),
            ("BINANCE_BASE_URL", &self.binance_base_url),
        ] {
            url::Url::parse(url).map_err(|e| invalid(key, e.to_string()))?;
        }
        Ok(())
    }
}
