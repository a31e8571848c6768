pub mod alert_policy;
pub mod contributions;
pub mod scorer;

pub use alert_policy::{AlertDecision, AlertPolicy};
pub use scorer::{Scorer, rationale};
