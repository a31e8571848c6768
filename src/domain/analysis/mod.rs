pub mod score;
pub mod snapshot;
pub mod weights;

pub use score::{Score, SignalLabel, TimeframeContribution};
pub use snapshot::{IchimokuLines, IndicatorSnapshot, PivotLevels, TrendDirection};
pub use weights::{ScoringPolicy, ScoringWeights, SignalThresholds, TimeframeWeights};
