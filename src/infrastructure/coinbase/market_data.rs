//! Coinbase Exchange market data
//!
//! Public candles endpoint, no authentication:
//! `GET /products/{product_id}/candles?granularity=<seconds>`.
//! Rows come back newest first as `[time, low, high, open, close, volume]`.

use crate::domain::market::{Candle, Timeframe};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::{HttpClientFactory, endpoint, status_error};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Coinbase never returns more than this many candles per request.
const MAX_CANDLES_PER_REQUEST: usize = 300;

pub struct CoinbaseMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl CoinbaseMarketDataService {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
        }
    }
}

/// "BTC/USD" → "BTC-USD"; product ids are already dash separated.
pub fn product_id(symbol: &str) -> String {
    symbol.replace('/', "-").to_uppercase()
}

/// Decodes candle rows, dropping the ones that are not six numbers.
pub fn parse_candles(symbol: &str, rows: &[Value]) -> Vec<Candle> {
    let mut dropped = 0;
    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            let candle = parse_row(row);
            if candle.is_none() {
                dropped += 1;
            }
            candle
        })
        .collect();
    if dropped > 0 {
        warn!(
            "CoinbaseMarketDataService: dropped {} malformed candle rows for {}",
            dropped, symbol
        );
    }
    candles
}

fn parse_row(row: &Value) -> Option<Candle> {
    let arr = row.as_array()?;
    if arr.len() < 6 {
        return None;
    }
    let time = arr[0].as_i64()?;
    let low = arr[1].as_f64()?;
    let high = arr[2].as_f64()?;
    let open = arr[3].as_f64()?;
    let close = arr[4].as_f64()?;
    let volume = arr[5].as_f64()?;
    let timestamp = Utc.timestamp_opt(time, 0).single()?;
    Some(Candle::new(timestamp, open, high, low, close, volume))
}

#[async_trait]
impl MarketDataService for CoinbaseMarketDataService {
    fn name(&self) -> &str {
        "coinbase"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let product = product_id(symbol);
        let granularity = timeframe.to_coinbase_granularity().to_string();
        let url = endpoint(
            &self.base_url,
            &format!("/products/{}/candles", product),
            &[("granularity", granularity.as_str())],
        )?;

        debug!("CoinbaseMarketDataService: GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch Coinbase candles for {}", symbol))?;

        if !response.status().is_success() {
            return Err(status_error(symbol, &response).into());
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Coinbase candles for {}", symbol))?;

        let mut candles = parse_candles(symbol, &rows);
        candles.truncate(limit.min(MAX_CANDLES_PER_REQUEST));
        debug!(
            "CoinbaseMarketDataService: {} {} candles for {}",
            candles.len(),
            timeframe,
            symbol
        );
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_candles_maps_column_order() {
        let rows = vec![json!([1_700_003_600, 99.0, 105.0, 100.0, 104.0, 12.5])];
        let candles = parse_candles("BTC-USD", &rows);
        assert_eq!(candles.len(), 1);
        let c = &candles[0];
        assert_eq!(c.timestamp.timestamp(), 1_700_003_600);
        assert_eq!(c.low, 99.0);
        assert_eq!(c.high, 105.0);
        assert_eq!(c.open, 100.0);
        assert_eq!(c.close, 104.0);
        assert_eq!(c.volume, 12.5);
    }

    #[test]
    fn test_parse_candles_drops_malformed_rows() {
        let rows = vec![
            json!([1_700_003_600, 99.0, 105.0, 100.0, 104.0, 12.5]),
            json!([1_700_000_000, "x", 105.0, 100.0, 104.0, 12.5]),
            json!([1_700_000_000, 1.0, 2.0]),
            json!({"time": 1}),
        ];
        assert_eq!(parse_candles("BTC-USD", &rows).len(), 1);
    }

    #[test]
    fn test_product_id() {
        assert_eq!(product_id("btc/usd"), "BTC-USD");
        assert_eq!(product_id("ETH-USD"), "ETH-USD");
    }
}
