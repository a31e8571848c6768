//! Key lookup shared by every sub-configuration.
//!
//! Production reads the process environment; tests pass a map so they never
//! touch global state.

use crate::domain::errors::ConfigError;
use std::collections::HashMap;
use std::str::FromStr;

pub trait EnvSource {
    /// Value of `key`, with surrounding whitespace removed. Empty counts as unset.
    fn get(&self, key: &str) -> Option<String>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }
}

impl dyn EnvSource + '_ {
    /// Parsed value of `key`, or `default` when unset.
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: format!("'{}': {}", raw, e),
            }),
        }
    }
}

/// The process environment (after `dotenvy` has loaded `.env`).
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Comma separated list, blanks dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_or_through_trait_object() {
        let map = source(&[("CANDLE_LIMIT", " 120 "), ("MIN_CANDLES", "many"), ("EMPTY", "  ")]);
        let env: &dyn EnvSource = &map;

        assert_eq!(env.parse_or("CANDLE_LIMIT", 300usize).unwrap(), 120);
        assert_eq!(env.parse_or("EMPTY", 7u32).unwrap(), 7);
        assert_eq!(env.parse_or("MISSING", true).unwrap(), true);

        let err = env.parse_or("MIN_CANDLES", 60usize).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "MIN_CANDLES"));
    }

    #[test]
    fn test_require_and_split_list() {
        let map = source(&[("SYMBOLS", "BTC-USD, ,ETH-USD,")]);
        let env: &dyn EnvSource = &map;
        assert_eq!(split_list(&env.require("SYMBOLS").unwrap()), vec!["BTC-USD", "ETH-USD"]);
        assert_eq!(
            env.require("DISCORD_WEBHOOK_URL").unwrap_err(),
            ConfigError::Missing {
                key: "DISCORD_WEBHOOK_URL".to_string()
            }
        );
    }
}
