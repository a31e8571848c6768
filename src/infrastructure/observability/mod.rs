//! Prometheus metrics for the polling cycle
//!
//! Nothing is served over HTTP; the scheduler logs the text rendering.

pub mod metrics;

pub use metrics::Metrics;
