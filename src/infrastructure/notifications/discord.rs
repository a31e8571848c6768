use crate::domain::alert::Alert;
use crate::domain::errors::SinkError;
use crate::domain::ports::NotificationService;
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Discord caps message content at 2000 characters.
const MAX_CONTENT_CHARS: usize = 2000;

pub struct DiscordNotifier {
    client: ClientWithMiddleware,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            webhook_url: webhook_url.into(),
        }
    }
}

fn content(alert: &Alert) -> String {
    alert.message().chars().take(MAX_CONTENT_CHARS).collect()
}

#[async_trait]
impl NotificationService for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content(alert) }))
            .send()
            .await
            .context("Failed to post Discord webhook")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                sink: "discord".to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }
        debug!("DiscordNotifier: sent alert for {}", alert.symbol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::SignalLabel;
    use chrono::Utc;

    #[test]
    fn test_content_is_capped() {
        let alert = Alert {
            symbol: "BTC-USD".to_string(),
            signal: SignalLabel::StrongBuy,
            previous: None,
            price: 1.0,
            score: 9.0,
            rationale: "x".repeat(5000),
            raised_at: Utc::now(),
        };
        assert_eq!(content(&alert).chars().count(), MAX_CONTENT_CHARS);
    }
}
