pub mod fetcher;
pub mod request_throttle;
pub mod sentiment_service;
pub mod ttl_cache;

pub use fetcher::{CandleCache, MarketDataFetcher};
pub use request_throttle::RequestThrottle;
pub use sentiment_service::SentimentService;
pub use ttl_cache::TtlCache;
