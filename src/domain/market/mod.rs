pub mod candle;
pub mod series;
pub mod timeframe;

pub use candle::Candle;
pub use series::Series;
pub use timeframe::Timeframe;
