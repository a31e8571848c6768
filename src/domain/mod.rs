// Alerts pushed to notifiers
pub mod alert;

// Indicator snapshots, scores and scoring policy
pub mod analysis;

// Domain-specific error types
pub mod errors;

// Candles, series, timeframes
pub mod market;

// Port interfaces
pub mod ports;

// Report table schema
pub mod report;

// Repository traits
pub mod repositories;

// Market sentiment inputs
pub mod sentiment;

// Candle sanity checks
pub mod validation;
