use crate::domain::sentiment::{Sentiment, SentimentClassification, SentimentProvider};
use crate::infrastructure::core::{HttpClientFactory, endpoint};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.alternative.me";

#[derive(Debug, Deserialize)]
struct AlternativeMeResponse {
    data: Vec<AlternativeMeData>,
}

#[derive(Debug, Deserialize)]
struct AlternativeMeData {
    value: String,
    timestamp: String,
}

pub struct AlternativeMeSentimentProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl AlternativeMeSentimentProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
        }
    }
}

fn parse_reading(body: AlternativeMeResponse) -> anyhow::Result<Sentiment> {
    let Some(data) = body.data.first() else {
        anyhow::bail!("No sentiment data found in response");
    };

    let value: u8 = data
        .value
        .trim()
        .parse()
        .context("Failed to parse sentiment value")?;
    let timestamp_secs: i64 = data
        .timestamp
        .trim()
        .parse()
        .context("Failed to parse timestamp")?;
    let timestamp = Utc
        .timestamp_opt(timestamp_secs, 0)
        .single()
        .context("Sentiment timestamp out of range")?;

    // Re-classify based on our domain rules to ensure consistency
    let classification = SentimentClassification::from_score(value);

    Ok(Sentiment {
        value,
        classification,
        timestamp,
        source: "Alternative.me (Crypto Fear & Greed)".to_string(),
    })
}

#[async_trait]
impl SentimentProvider for AlternativeMeSentimentProvider {
    async fn fetch_sentiment(&self) -> anyhow::Result<Sentiment> {
        let url = endpoint(&self.base_url, "/fng/", &[("limit", "1")])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to Alternative.me")?;

        if !response.status().is_success() {
            anyhow::bail!("Alternative.me API returned status: {}", response.status());
        }

        let body: AlternativeMeResponse = response
            .json()
            .await
            .context("Failed to parse Alternative.me response")?;

        let sentiment = parse_reading(body)?;
        info!(
            "Fetched Sentiment: {} ({}) {} from {}",
            sentiment.value,
            sentiment.classification,
            sentiment.classification.emoji(),
            sentiment.timestamp
        );
        Ok(sentiment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> AlternativeMeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_reading_reclassifies() {
        let reading = parse_reading(body(
            r#"{"name":"Fear and Greed Index","data":[{"value":"22","value_classification":"Fear","timestamp":"1717200000","time_until_update":"100"}]}"#,
        ))
        .unwrap();
        assert_eq!(reading.value, 22);
        assert_eq!(reading.classification, SentimentClassification::ExtremeFear);
        assert_eq!(reading.timestamp.timestamp(), 1_717_200_000);
    }

    #[test]
    fn test_parse_reading_rejects_empty_and_garbage() {
        assert!(parse_reading(body(r#"{"data":[]}"#)).is_err());
        assert!(parse_reading(body(r#"{"data":[{"value":"high","timestamp":"1"}]}"#)).is_err());
    }
}
