//! Google Sheets values API sink.
//!
//! Each cycle clears the worksheet and writes the whole table in one `PUT`.
//! Authentication is a ready-made OAuth bearer token; minting it is left to
//! the deployment.

use crate::domain::errors::SinkError;
use crate::domain::ports::SheetSink;
use crate::domain::report::{Cell, ReportTable};
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

pub struct GoogleSheetsSink {
    client: ClientWithMiddleware,
    base_url: String,
    sheet_id: String,
    worksheet: String,
    access_token: String,
}

impl GoogleSheetsSink {
    pub fn new(
        base_url: impl Into<String>,
        sheet_id: impl Into<String>,
        worksheet: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            base_url: base_url.into(),
            sheet_id: sheet_id.into(),
            worksheet: worksheet.into(),
            access_token: access_token.into(),
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{worksheet}{suffix}` with every
    /// segment percent-encoded.
    fn values_url(&self, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Google Sheets base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Google Sheets base URL cannot hold a path"))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.sheet_id.as_str(),
                "values",
                &format!("{}{}", self.worksheet, suffix),
            ]);
        Ok(url)
    }

    async fn check(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            sink: "google".to_string(),
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

/// Numbers stay numbers so the sheet can sort and chart them.
fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Number { value, .. } if value.is_finite() => cell
            .render()
            .parse::<f64>()
            .map(|v| json!(v))
            .unwrap_or_else(|_| json!(cell.render())),
        other => json!(other.render()),
    }
}

fn values_body(worksheet: &str, table: &ReportTable) -> Value {
    let mut values: Vec<Vec<Value>> = Vec::with_capacity(table.rows.len() + 1);
    values.push(table.headers.iter().map(|h| json!(h)).collect());
    values.extend(table.rows.iter().map(|row| row.iter().map(cell_value).collect()));
    json!({
        "range": worksheet,
        "majorDimension": "ROWS",
        "values": values,
    })
}

#[async_trait]
impl SheetSink for GoogleSheetsSink {
    fn name(&self) -> &str {
        "google"
    }

    async fn replace_table(&self, table: &ReportTable) -> Result<()> {
        let clear = self
            .client
            .post(self.values_url(":clear")?)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await
            .context("Failed to clear Google worksheet")?;
        self.check(clear).await?;

        let mut url = self.values_url("")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let update = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&values_body(&self.worksheet, table))
            .send()
            .await
            .context("Failed to write Google worksheet")?;
        self.check(update).await?;

        debug!(
            "GoogleSheetsSink: wrote {} rows to {}/{}",
            table.rows.len(),
            self.sheet_id,
            self.worksheet
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(worksheet: &str) -> GoogleSheetsSink {
        GoogleSheetsSink::new(
            DEFAULT_BASE_URL,
            "sheet123",
            worksheet,
            "token",
            Duration::from_secs(5),
            0,
        )
    }

    #[test]
    fn test_values_url_encodes_worksheet() {
        let url = sink("Multi TF").values_url(":clear").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/Multi%20TF:clear"
        );
    }

    #[test]
    fn test_values_body_keeps_numbers_numeric() {
        let mut table = ReportTable::new(vec!["Crypto".to_string(), "Price".to_string(), "RSI".to_string()]);
        table.rows.push(vec![
            Cell::text("BTC-USD"),
            Cell::number(64000.123, 2),
            Cell::Empty,
        ]);
        let body = values_body("MultiTF", &table);
        assert_eq!(body["range"], "MultiTF");
        assert_eq!(body["values"][0][0], "Crypto");
        assert_eq!(body["values"][1][0], "BTC-USD");
        assert_eq!(body["values"][1][1], 64000.12);
        assert_eq!(body["values"][1][2], "");
    }
}
