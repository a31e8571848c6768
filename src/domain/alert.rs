use crate::domain::analysis::SignalLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signal change worth pushing to a messaging channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub symbol: String,
    pub signal: SignalLabel,
    pub previous: Option<SignalLabel>,
    pub price: f64,
    pub score: f64,
    pub rationale: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    /// Plain-text body shared by every notifier.
    pub fn message(&self) -> String {
        let previous = self
            .previous
            .map(|p| p.decorated())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "📢 {} signal change: {} (was {})\nPrice: {:.4}\nScore: {:.1}/10\n{}\n{}",
            self.symbol,
            self.signal.decorated(),
            previous,
            self.price,
            self.score,
            self.rationale,
            self.raised_at.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_mentions_transition() {
        let alert = Alert {
            symbol: "ETH-USD".to_string(),
            signal: SignalLabel::Buy,
            previous: Some(SignalLabel::Neutral),
            price: 3150.25,
            score: 6.4,
            rationale: "1h: trend 1.00".to_string(),
            raised_at: Utc::now(),
        };
        let msg = alert.message();
        assert!(msg.contains("ETH-USD"));
        assert!(msg.contains("🔵 Buy"));
        assert!(msg.contains("⚪ Neutral"));
        assert!(msg.contains("6.4/10"));
    }

    #[test]
    fn test_message_without_previous() {
        let alert = Alert {
            symbol: "SOL-USD".to_string(),
            signal: SignalLabel::StrongSell,
            previous: None,
            price: 1.0,
            score: 1.2,
            rationale: String::new(),
            raised_at: Utc::now(),
        };
        assert!(alert.message().contains("(was none)"));
    }
}
