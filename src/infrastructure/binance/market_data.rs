//! Binance Market Data Service
//!
//! Historical candle data from the public klines endpoint:
//! `GET /api/v3/klines?symbol=BTCUSDT&interval=1h&limit=300`.

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

const MAX_KLINES_PER_REQUEST: usize = 1000;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
        }
    }
}

/// "BTC/USDT" or "BTC-USDT" → "BTCUSDT"
pub fn denormalize_symbol(symbol: &str) -> String {
    symbol.replace(['/', '-'], "").to_uppercase()
}

/// Binance klines format: [openTime(ms), "open", "high", "low", "close", "volume", ...]
pub fn parse_klines(symbol: &str, klines: &[Value]) -> Vec<Candle> {
    let candles: Vec<Candle> = klines.iter().filter_map(parse_kline).collect();
    if candles.len() < klines.len() {
        warn!(
            "BinanceMarketDataService: dropped {} malformed klines for {}",
            klines.len() - candles.len(),
            symbol
        );
    }
    candles
}

fn parse_kline(k: &Value) -> Option<Candle> {
    let arr = k.as_array()?;
    if arr.len() < 6 {
        return None;
    }

    let timestamp = Utc.timestamp_millis_opt(arr[0].as_i64()?).single()?;

    let open = arr[1].as_str()?.parse::<f64>().ok()?;
    let high = arr[2].as_str()?.parse::<f64>().ok()?;
    let low = arr[3].as_str()?.parse::<f64>().ok()?;
    let close = arr[4].as_str()?.parse::<f64>().ok()?;
    let volume = arr[5].as_str()?.parse::<f64>().ok()?;

    Some(Candle::new(timestamp, open, high, low, close, volume))
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let api_symbol = denormalize_symbol(symbol);
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST).to_string();
        let url = endpoint(
            &self.base_url,
            "/api/v3/klines",
            &[
                ("symbol", api_symbol.as_str()),
                ("interval", timeframe.to_binance_string()),
                ("limit", limit.as_str()),
            ],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch klines from Binance")?;

        if !response.status().is_success() {
            return Err(status_error(symbol, &response).into());
        }

        let klines: Vec<Value> = response
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        let candles = parse_klines(symbol, &klines);
        debug!(
            "BinanceMarketDataService: Fetched {} {} bars for {}",
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
    fn test_binance_symbol_denormalization() {
        assert_eq!(denormalize_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(denormalize_symbol("eth-usdt"), "ETHUSDT");
        assert_eq!(denormalize_symbol("AVAXUSDT"), "AVAXUSDT");
    }

    #[test]
    fn test_parse_klines() {
        let klines = vec![
            json!([1_700_000_000_000i64, "100.0", "105.0", "99.0", "104.0", "12.5", 1_700_003_599_999i64, "0", 10, "0", "0", "0"]),
            json!([1_700_003_600_000i64, "104.0", "bad", "99.0", "104.0", "12.5"]),
        ];
        let candles = parse_klines("BTCUSDT", &klines);
        assert_eq!(candles.len(), 1);
        let c = &candles[0];
        assert_eq!(c.timestamp.timestamp(), 1_700_000_000);
        assert_eq!((c.open, c.high, c.low, c.close, c.volume), (100.0, 105.0, 99.0, 104.0, 12.5));
    }
}
