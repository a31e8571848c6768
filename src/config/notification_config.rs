//! Alert channel selection.

use super::env_source::EnvSource;
use crate::domain::errors::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum NotifierConfig {
    Log,
    Discord { webhook_url: String },
    Telegram { bot_token: String, chat_id: String },
    None,
}

impl NotifierConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            NotifierConfig::Log => "log",
            NotifierConfig::Discord { .. } => "discord",
            NotifierConfig::Telegram { .. } => "telegram",
            NotifierConfig::None => "none",
        }
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        match env.get_or("NOTIFIER", "log").to_lowercase().as_str() {
            "log" => Ok(NotifierConfig::Log),
            "discord" => {
                let webhook_url = env.require("DISCORD_WEBHOOK_URL")?;
                url::Url::parse(&webhook_url).map_err(|e| ConfigError::Invalid {
                    key: "DISCORD_WEBHOOK_URL".to_string(),
                    reason: e.to_string(),
                })?;
                Ok(NotifierConfig::Discord { webhook_url })
            }
            "telegram" => Ok(NotifierConfig::Telegram {
                bot_token: env.require("TELEGRAM_BOT_TOKEN")?,
                chat_id: env.require("TELEGRAM_CHAT_ID")?,
            }),
            "none" => Ok(NotifierConfig::None),
            other => Err(ConfigError::Invalid {
                key: "NOTIFIER".to_string(),
                reason: format!("'{}', expected 'log', 'discord', 'telegram' or 'none'", other),
            }),
        }
    }
}
