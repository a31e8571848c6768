use crate::domain::errors::MarketDataError;
use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// Fallback cool-down when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware.
    ///
    /// Transient failures (connect errors, 429, 5xx) are retried with
    /// exponential backoff, at most `max_retries` times.
    pub fn create_client(timeout: Duration, max_retries: u32) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("rustscore/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// `base` + `path` with the query parameters percent-encoded.
pub fn endpoint<K, V>(base: &str, path: &str, params: &[(K, V)]) -> Result<Url>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    let url = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
    };
    url.with_context(|| format!("Invalid endpoint URL: {}", raw))
}

/// Maps a non-2xx venue answer to the typed market-data error.
pub fn status_error(symbol: &str, response: &Response) -> MarketDataError {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return MarketDataError::RateLimitExceeded { retry_after_secs };
    }
    MarketDataError::RequestFailed {
        symbol: symbol.to_string(),
        status: status.as_u16(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_query() {
        let url = endpoint(
            "https://api.exchange.coinbase.com/",
            "/products/BTC-USD/candles",
            &[("granularity", "3600")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.exchange.coinbase.com/products/BTC-USD/candles?granularity=3600"
        );

        let url = endpoint("https://example.com", "/q", &[("text", "a b&c")]).unwrap();
        assert_eq!(url.query(), Some("text=a+b%26c"));
    }

    #[test]
    fn test_endpoint_without_params_has_no_query() {
        let url = endpoint::<&str, &str>("https://example.com", "/fng/", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/fng/");
    }

    #[test]
    fn test_endpoint_rejects_garbage_base() {
        assert!(endpoint("not a url", "/x", &[("a", "b")]).is_err());
    }
}
