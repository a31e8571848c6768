use crate::domain::alert::Alert;
use crate::domain::ports::NotificationService;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Writes alerts to the log instead of a messaging channel.
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, alert: &Alert) -> Result<()> {
        info!("ALERT {}", alert.message().replace('\n', " | "));
        Ok(())
    }
}

/// Swallows alerts. Used with `NOTIFIER=none`.
pub struct NullNotifier;

#[async_trait]
impl NotificationService for NullNotifier {
    fn name(&self) -> &str {
        "none"
    }

    async fn notify(&self, _alert: &Alert) -> Result<()> {
        Ok(())
    }
}
