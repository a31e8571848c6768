// One polling cycle and its schedule
pub mod cycle;

// Indicator engine
pub mod indicators;

// Candle and sentiment fetching
pub mod market_data;

// Report table
pub mod report;

// Scoring and alert policy
pub mod scoring;

// Wiring
pub mod system;
