pub mod csv_sheet;
pub mod google_sheets;
pub mod none;

pub use csv_sheet::CsvSheetSink;
pub use google_sheets::GoogleSheetsSink;
pub use none::NullSheetSink;
