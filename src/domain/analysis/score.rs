use crate::domain::market::Timeframe;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete decision derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalLabel {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalLabel {
    /// Coloured dot from the report palette.
    pub fn dot(&self) -> &'static str {
        match self {
            SignalLabel::StrongBuy => "🟢",
            SignalLabel::Buy => "🔵",
            SignalLabel::Neutral => "⚪",
            SignalLabel::Sell => "🟠",
            SignalLabel::StrongSell => "🔴",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalLabel::StrongBuy => "Strong Buy",
            SignalLabel::Buy => "Buy",
            SignalLabel::Neutral => "Neutral",
            SignalLabel::Sell => "Sell",
            SignalLabel::StrongSell => "Strong Sell",
        }
    }

    /// "🟢 Strong Buy"
    pub fn decorated(&self) -> String {
        format!("{} {}", self.dot(), self.as_str())
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SignalLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "strong buy" | "strongbuy" => Ok(SignalLabel::StrongBuy),
            "buy" => Ok(SignalLabel::Buy),
            "neutral" => Ok(SignalLabel::Neutral),
            "sell" => Ok(SignalLabel::Sell),
            "strong sell" | "strongsell" => Ok(SignalLabel::StrongSell),
            _ => anyhow::bail!("Invalid signal label: {}", s),
        }
    }
}

/// Per-timeframe contributions (each in [0,1] before weighting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeContribution {
    pub timeframe: Timeframe,
    /// false when the timeframe was configured but no snapshot was supplied
    pub present: bool,
    pub rsi: f64,
    pub trend: f64,
    pub macd: f64,
    pub bollinger: f64,
    pub volume: f64,
    /// Weighted composite of the five contributions
    pub composite: f64,
    pub timeframe_weight: f64,
}

/// Final decision for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Display value on [0, 10], one decimal.
    pub value: f64,
    pub label: SignalLabel,
    pub sentiment_contribution: f64,
    pub breakdown: Vec<TimeframeContribution>,
}
