use crate::domain::ports::SheetSink;
use crate::domain::report::ReportTable;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Drops every table. Used with `SHEET_SINK=none`.
pub struct NullSheetSink;

#[async_trait]
impl SheetSink for NullSheetSink {
    fn name(&self) -> &str {
        "none"
    }

    async fn replace_table(&self, table: &ReportTable) -> Result<()> {
        debug!("NullSheetSink: discarding {} rows", table.rows.len());
        Ok(())
    }
}
