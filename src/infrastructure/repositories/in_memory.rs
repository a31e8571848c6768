//! In-memory signal history.
//!
//! Thread-safe and async like the SQLite repository, but lost on restart.
//! Used by tests and when no database is configured.

use crate::domain::repositories::{SignalLogEntry, SignalLogRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemorySignalLogRepository {
    entries: Arc<RwLock<Vec<SignalLogEntry>>>,
}

impl InMemorySignalLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemorySignalLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalLogRepository for InMemorySignalLogRepository {
    async fn append(&self, entry: &SignalLogEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn last_for_symbol(&self, symbol: &str) -> Result<Option<SignalLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().find(|e| e.symbol == symbol).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SignalLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
