//! Repository abstractions for the signal history.
//!
//! The history is append-only. The latest entry per symbol drives the alert
//! policy; `recent` feeds diagnostics.

use crate::domain::analysis::SignalLabel;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One notified signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalLogEntry {
    pub logged_at: DateTime<Utc>,
    pub symbol: String,
    pub signal: SignalLabel,
    pub score: f64,
    pub reason: String,
}

#[async_trait]
pub trait SignalLogRepository: Send + Sync {
    /// Append an entry. Entries are never updated.
    async fn append(&self, entry: &SignalLogEntry) -> Result<()>;

    /// Most recently appended entry for `symbol`.
    async fn last_for_symbol(&self, symbol: &str) -> Result<Option<SignalLogEntry>>;

    /// Newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<SignalLogEntry>>;
}
