use crate::domain::analysis::SignalLabel;
use crate::domain::repositories::{SignalLogEntry, SignalLogRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

pub struct SqliteSignalLogRepository {
    pool: SqlitePool,
}

impl SqliteSignalLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<SignalLogEntry> {
    let logged_at_ms: i64 = row.try_get("logged_at")?;
    let signal: String = row.try_get("signal")?;
    Ok(SignalLogEntry {
        logged_at: Utc
            .timestamp_millis_opt(logged_at_ms)
            .single()
            .context("Stored signal timestamp out of range")?,
        symbol: row.try_get("symbol")?,
        signal: SignalLabel::from_str(&signal)?,
        score: row.try_get("score")?,
        reason: row.try_get("reason")?,
    })
}

#[async_trait]
impl SignalLogRepository for SqliteSignalLogRepository {
    async fn append(&self, entry: &SignalLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO signal_log (logged_at, symbol, signal, score, reason)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.logged_at.timestamp_millis())
        .bind(&entry.symbol)
        .bind(entry.signal.as_str())
        .bind(entry.score)
        .bind(&entry.reason)
        .execute(&self.pool)
        .await
        .context("Failed to append signal log entry")?;

        debug!(
            "SqliteSignalLogRepository: logged {} {}",
            entry.symbol, entry.signal
        );
        Ok(())
    }

    async fn last_for_symbol(&self, symbol: &str) -> Result<Option<SignalLogEntry>> {
        let row = sqlx::query(
            r#"
            SELECT logged_at, symbol, signal, score, reason
            FROM signal_log
            WHERE symbol = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query last signal")?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SignalLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT logged_at, symbol, signal, score, reason
            FROM signal_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query recent signals")?;

        rows.iter().map(entry_from_row).collect()
    }
}
