pub mod binance;
pub mod clock;
pub mod coinbase;
pub mod core;
pub mod mock;
pub mod notifications;
pub mod observability;
pub mod persistence;
pub mod repositories;
pub mod sentiment;
pub mod sinks;

pub use clock::SystemClock;
pub use repositories::InMemorySignalLogRepository;
