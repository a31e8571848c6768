use crate::domain::analysis::SignalLabel;

/// Outcome of comparing a fresh signal to the last one that was notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Notify { previous: Option<SignalLabel> },
    Suppress,
}

impl AlertDecision {
    pub fn should_notify(&self) -> bool {
        matches!(self, AlertDecision::Notify { .. })
    }
}

/// Edge-triggered alerting: a notification goes out when the label changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertPolicy;

impl AlertPolicy {
    /// Without any logged signal, only a non-neutral label is worth a message.
    pub fn evaluate(&self, last_logged: Option<SignalLabel>, current: SignalLabel) -> AlertDecision {
        match last_logged {
            Some(previous) if previous == current => AlertDecision::Suppress,
            Some(previous) => AlertDecision::Notify {
                previous: Some(previous),
            },
            None if current == SignalLabel::Neutral => AlertDecision::Suppress,
            None => AlertDecision::Notify { previous: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_signal() {
        let policy = AlertPolicy;
        assert_eq!(policy.evaluate(None, SignalLabel::Neutral), AlertDecision::Suppress);
        assert_eq!(
            policy.evaluate(None, SignalLabel::Buy),
            AlertDecision::Notify { previous: None }
        );
    }

    #[test]
    fn test_edge_triggered() {
        let policy = AlertPolicy;
        assert!(!policy
            .evaluate(Some(SignalLabel::Buy), SignalLabel::Buy)
            .should_notify());
        assert_eq!(
            policy.evaluate(Some(SignalLabel::Buy), SignalLabel::Neutral),
            AlertDecision::Notify {
                previous: Some(SignalLabel::Buy)
            }
        );
    }
}
