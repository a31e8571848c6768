pub mod signal_log_repository;

pub use signal_log_repository::SqliteSignalLogRepository;
