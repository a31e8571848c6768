//! Spreadsheet sink selection.

use super::env_source::EnvSource;
use crate::domain::errors::ConfigError;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetSinkConfig {
    Csv {
        path: PathBuf,
    },
    Google {
        sheet_id: String,
        access_token: String,
        worksheet: String,
    },
    None,
}

impl SheetSinkConfig {
    /// Name safe to log; the variants themselves may carry credentials.
    pub fn kind(&self) -> &'static str {
        match self {
            SheetSinkConfig::Csv { .. } => "csv",
            SheetSinkConfig::Google { .. } => "google",
            SheetSinkConfig::None => "none",
        }
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        match env.get_or("SHEET_SINK", "csv").to_lowercase().as_str() {
            "csv" => Ok(SheetSinkConfig::Csv {
                path: PathBuf::from(env.get_or("CSV_OUTPUT_PATH", "data/market_data.csv")),
            }),
            "google" => Ok(SheetSinkConfig::Google {
                sheet_id: env.require("GOOGLE_SHEET_ID")?,
                access_token: env.require("GOOGLE_SHEETS_ACCESS_TOKEN")?,
                worksheet: env.get_or("GOOGLE_WORKSHEET", "MultiTF"),
            }),
            "none" => Ok(SheetSinkConfig::None),
            other => Err(ConfigError::Invalid {
                key: "SHEET_SINK".to_string(),
                reason: format!("'{}', expected 'csv', 'google' or 'none'", other),
            }),
        }
    }
}
