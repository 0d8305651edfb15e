//! In-process spreadsheet extraction.

pub mod excel;

pub use excel::{range_to_csv, read_sheet_range, read_sheet_to_csv};
