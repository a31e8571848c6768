pub mod alternative_me;
pub mod coingecko;

pub use alternative_me::AlternativeMeSentimentProvider;
pub use coingecko::CoinGeckoBuzzProvider;
