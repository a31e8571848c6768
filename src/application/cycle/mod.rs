pub mod runner;
pub mod scheduler;

pub use runner::{CycleDeps, CycleReport, CycleRunner, CycleSettings, SkippedSymbol};
pub use scheduler::{CycleScheduler, IntervalTicker};
