use crate::domain::market::Candle;
use tracing::warn;

/// Centralized validator for market data integrity.
///
/// Rejects candles that are physically impossible: non-finite or non-positive
/// prices, an inverted high/low range, or negative volume.
pub struct StrictCandleValidator;

impl StrictCandleValidator {
    /// Validates a Candle. Returns true if valid, false otherwise.
    pub fn validate_candle(symbol: &str, candle: &Candle) -> bool {
        let prices = [candle.open, candle.high, candle.low, candle.close];

        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            warn!(
                "Validation FAILED: Candle for {} at {} has non-positive price component(s)",
                symbol, candle.timestamp
            );
            return false;
        }

        if candle.low > candle.high {
            warn!(
                "Validation FAILED: Candle for {} has low {} > high {}",
                symbol, candle.low, candle.high
            );
            return false;
        }

        if !candle.volume.is_finite() || candle.volume < 0.0 {
            warn!(
                "Validation FAILED: Candle for {} has invalid volume: {}",
                symbol, candle.volume
            );
            return false;
        }

        true
    }

    /// Keeps only valid candles, logging how many were dropped.
    pub fn retain_valid(symbol: &str, candles: Vec<Candle>) -> Vec<Candle> {
        let before = candles.len();
        let kept: Vec<Candle> = candles
            .into_iter()
            .filter(|c| Self::validate_candle(symbol, c))
            .collect();
        if kept.len() < before {
            warn!(
                "StrictCandleValidator: dropped {} invalid candle(s) for {}",
                before - kept.len(),
                symbol
            );
        }
        kept
    }
}
