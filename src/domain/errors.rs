use thiserror::Error;

/// Errors related to market data and connectivity
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request for {symbol} failed with HTTP status {status}")]
    RequestFailed { symbol: String, status: u16 },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },

    #[error("Service timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Rate limit exceeded: retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Insufficient history for {symbol} {timeframe}: {available} < {required} candles")]
    InsufficientHistory {
        symbol: String,
        timeframe: String,
        available: usize,
        required: usize,
    },
}

impl MarketDataError {
    /// Rate limits and timeouts clear on their own; the symbol is retried next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::RateLimitExceeded { .. } | MarketDataError::Timeout { .. } => true,
            MarketDataError::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised by report and notification sinks
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink {sink} rejected the write with HTTP status {status}: {body}")]
    Rejected {
        sink: String,
        status: u16,
        body: String,
    },

    #[error("Sink {sink} I/O failure: {reason}")]
    Io { sink: String, reason: String },
}

/// Configuration errors, fatal at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration key {key}")]
    Missing { key: String },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_error_formatting() {
        let err = MarketDataError::RequestFailed {
            symbol: "BTC-USD".to_string(),
            status: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("BTC-USD"));
        assert!(msg.contains("500"));
        assert!(err.is_transient());

        let err = MarketDataError::RequestFailed {
            symbol: "BTC-USD".to_string(),
            status: 404,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_rate_limit_recoverable_through_anyhow() {
        let err: anyhow::Error = MarketDataError::RateLimitExceeded {
            retry_after_secs: 30,
        }
        .into();
        let typed = err.downcast_ref::<MarketDataError>();
        assert!(matches!(
            typed,
            Some(MarketDataError::RateLimitExceeded { retry_after_secs: 30 })
        ));
    }

    #[test]
    fn test_config_error_formatting() {
        let err = ConfigError::Missing {
            key: "DISCORD_WEBHOOK_URL".to_string(),
        };
        assert!(err.to_string().contains("DISCORD_WEBHOOK_URL"));
    }
}
