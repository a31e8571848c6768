pub mod directional;
pub mod engine;
pub mod levels;
pub mod momentum;
pub mod smoothing;

pub use engine::{EnabledIndicators, IndicatorEngine, IndicatorKind, IndicatorParams};
