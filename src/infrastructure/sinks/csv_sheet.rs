use crate::domain::errors::SinkError;
use crate::domain::ports::SheetSink;
use crate::domain::report::ReportTable;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the report table to a CSV file, replacing it on every cycle.
///
/// The table goes to a sibling temp file first and is renamed into place,
/// so readers never see a half-written sheet.
pub struct CsvSheetSink {
    path: PathBuf,
}

impl CsvSheetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(e: impl std::fmt::Display) -> SinkError {
    SinkError::Io {
        sink: "csv".to_string(),
        reason: e.to_string(),
    }
}

fn write_atomically(path: &Path, rows: &[Vec<String>]) -> Result<(), SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let tmp = path.with_extension("csv.tmp");
    {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)
            .map_err(io_error)?;
        for row in rows {
            wtr.write_record(row).map_err(io_error)?;
        }
        wtr.flush().map_err(io_error)?;
    }
    std::fs::rename(&tmp, path).map_err(io_error)
}

#[async_trait]
impl SheetSink for CsvSheetSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn replace_table(&self, table: &ReportTable) -> Result<()> {
        let rows = table.to_string_rows();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &rows))
            .await
            .map_err(io_error)??;
        debug!(
            "CsvSheetSink: wrote {} rows to {}",
            table.rows.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::Cell;

    fn table(symbols: &[&str]) -> ReportTable {
        let mut t = ReportTable::new(vec!["Crypto".to_string(), "Price".to_string()]);
        for s in symbols {
            t.rows.push(vec![Cell::text(*s), Cell::number(101.256, 2)]);
        }
        t
    }

    #[tokio::test]
    async fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("market_data.csv");
        let sink = CsvSheetSink::new(&path);

        sink.replace_table(&table(&["BTC-USD", "ETH-USD"])).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["Crypto,Price", "BTC-USD,101.26", "ETH-USD,101.26"]);
    }

    #[tokio::test]
    async fn test_rewrite_replaces_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_data.csv");
        let sink = CsvSheetSink::new(&path);

        sink.replace_table(&table(&["BTC-USD", "ETH-USD"])).await.unwrap();
        sink.replace_table(&table(&["SOL-USD"])).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("SOL-USD"));
        assert!(!content.contains("BTC-USD"));
        assert!(!dir.path().join("market_data.csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let sink = CsvSheetSink::new(blocker.join("out.csv"));

        let err = sink.replace_table(&table(&["BTC-USD"])).await.unwrap_err();
        assert!(err.downcast_ref::<SinkError>().is_some());
    }
}
