use crate::domain::alert::Alert;
use crate::domain::errors::SinkError;
use crate::domain::ports::NotificationService;
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Bot API `sendMessage` to a single chat.
pub struct TelegramNotifier {
    client: ClientWithMiddleware,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

/// The request URL carries the bot token; keep it out of the error chain.
fn redact(e: reqwest_middleware::Error) -> anyhow::Error {
    match e {
        reqwest_middleware::Error::Reqwest(e) => {
            anyhow!("Failed to call Telegram sendMessage: {}", e.without_url())
        }
        reqwest_middleware::Error::Middleware(e) => {
            anyhow!("Failed to call Telegram sendMessage: {}", e)
        }
    }
}

#[async_trait]
impl NotificationService for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(self.send_message_url())
            .json(&json!({
                "chat_id": self.chat_id,
                "text": alert.message(),
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                sink: "telegram".to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }
        debug!("TelegramNotifier: sent alert for {}", alert.symbol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let n = TelegramNotifier::new(
            "https://api.telegram.org/",
            "123:abc",
            "42",
            Duration::from_secs(5),
            0,
        );
        assert_eq!(n.send_message_url(), "https://api.telegram.org/bot123:abc/sendMessage");
    }
}
