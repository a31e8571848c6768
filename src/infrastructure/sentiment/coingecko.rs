//! CoinGecko public API: trending searches and global market data.

use crate::domain::sentiment::MarketBuzzProvider;
use crate::infrastructure::core::{HttpClientFactory, endpoint};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingCoin>,
}

#[derive(Debug, Deserialize)]
struct TrendingCoin {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    market_cap_change_percentage_24h_usd: f64,
}

pub struct CoinGeckoBuzzProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl CoinGeckoBuzzProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = endpoint::<&str, &str>(&self.base_url, path, &[])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to CoinGecko {}", path))?;

        if !response.status().is_success() {
            anyhow::bail!("CoinGecko {} returned status: {}", path, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse CoinGecko {} response", path))
    }
}

fn trending_symbols(body: TrendingResponse) -> Vec<String> {
    body.coins
        .into_iter()
        .map(|c| c.item.symbol.to_uppercase())
        .collect()
}

#[async_trait]
impl MarketBuzzProvider for CoinGeckoBuzzProvider {
    async fn fetch_trending(&self) -> Result<Vec<String>> {
        let body: TrendingResponse = self.get("/api/v3/search/trending").await?;
        let symbols = trending_symbols(body);
        debug!("CoinGecko trending: {:?}", symbols);
        Ok(symbols)
    }

    async fn fetch_market_cap_change_24h(&self) -> Result<f64> {
        let body: GlobalResponse = self.get("/api/v3/global").await?;
        let change = body.data.market_cap_change_percentage_24h_usd;
        if !change.is_finite() {
            anyhow::bail!("CoinGecko market cap change is not a number");
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_symbols_are_uppercased() {
        let body: TrendingResponse = serde_json::from_str(
            r#"{"coins":[{"item":{"id":"pepe","symbol":"pepe","score":0}},{"item":{"symbol":"SOL"}}],"nfts":[]}"#,
        )
        .unwrap();
        assert_eq!(trending_symbols(body), vec!["PEPE", "SOL"]);
    }

    #[test]
    fn test_missing_coins_is_empty() {
        let body: TrendingResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(trending_symbols(body).is_empty());
    }

    #[test]
    fn test_global_response_shape() {
        let body: GlobalResponse = serde_json::from_str(
            r#"{"data":{"active_cryptocurrencies":1,"market_cap_change_percentage_24h_usd":-2.75}}"#,
        )
        .unwrap();
        assert_eq!(body.data.market_cap_change_percentage_24h_usd, -2.75);
    }
}
