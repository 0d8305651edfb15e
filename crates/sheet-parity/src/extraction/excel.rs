//! Spreadsheet reading via `calamine`.
//!
//! Opens a workbook (XLSX, XLSM, XLSB, XLS, ODS), maps each native `Data` cell to a
//! [`CellValue`], and renders the sheet as canonical CSV.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheet_parity::extraction::excel::read_sheet_to_csv;
//!
//! # fn example() -> sheet_parity::Result<()> {
//! let sheet = read_sheet_to_csv("data.xlsx", 0)?;
//! println!("{} rows", sheet.row_count);
//! print!("{}", sheet.text);
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, SheetParityError};
use crate::normalize::normalize_cell;
use crate::serializer::RowSerializer;
use crate::types::{CellValue, NormalizedCell, SheetCsv};

/// Read sheet `sheet_index` (zero-based) of the workbook at `path` as canonical CSV.
///
/// # Errors
///
/// - [`SheetParityError::Io`] if the file cannot be read
/// - [`SheetParityError::Parsing`] if the workbook or sheet cannot be decoded
/// - [`SheetParityError::Validation`] if `sheet_index` is out of range
pub fn read_sheet_to_csv(path: impl AsRef<Path>, sheet_index: usize) -> Result<SheetCsv> {
    let range = read_sheet_range(path.as_ref(), sheet_index)?;
    range_to_csv(&range)
}

/// Load the cell range of one sheet.
pub fn read_sheet_range(path: &Path, sheet_index: usize) -> Result<Range<Data>> {
    // calamine reports a missing file as a format error; surface it as IO instead
    std::fs::metadata(path)?;

    let mut workbook = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(calamine::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::InvalidData => {
            return Err(SheetParityError::parsing_with_source(
                format!("Cannot detect spreadsheet format of {}", path.display()),
                io_err,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let sheet_count = workbook.sheet_names().len();
    let range = workbook.worksheet_range_at(sheet_index).ok_or_else(|| {
        SheetParityError::validation(format!(
            "Sheet index {} out of range: {} has {} sheet(s)",
            sheet_index,
            path.display(),
            sheet_count
        ))
    })??;

    tracing::debug!(
        path = %path.display(),
        sheet_index,
        rows = range.height(),
        cols = range.width(),
        "Loaded sheet range"
    );

    Ok(range)
}

/// Render a cell range as canonical CSV, rows in native order.
///
/// Output is anchored at A1: a range that starts below row 1 is preceded by empty rows, and
/// every row is padded with empty fields for the columns left of the range.
pub fn range_to_csv(range: &Range<Data>) -> Result<SheetCsv> {
    let (rows, cols) = range.get_size();
    let (row_offset, col_offset) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));
    let width = col_offset + cols;

    let serializer = RowSerializer::new();
    let mut text = String::with_capacity((row_offset + rows) * width * 8);
    let mut row_count = 0;

    let leading = std::iter::repeat_with(|| vec![NormalizedCell::new(); width]).take(row_offset);
    let body = range.rows().map(|row| {
        let mut cells = Vec::with_capacity(width);
        cells.resize(col_offset, NormalizedCell::new());
        cells.extend(row.iter().map(|cell| normalize_cell(&CellValue::from(cell))));
        cells
    });

    for line in serializer.serialize_rows(leading.chain(body)) {
        text.push_str(&line?);
        row_count += 1;
    }

    Ok(SheetCsv { text, row_count })
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Integer(*i),
            Data::Float(f) => CellValue::Real(*f),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::DateTime(dt) => excel_datetime_to_cell(dt),
            Data::DateTimeIso(s) => parse_iso_datetime(s),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

fn excel_datetime_to_cell(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(duration) => CellValue::Text(format_duration(duration.num_seconds())),
            None => CellValue::Text(dt.as_f64().to_string()),
        };
    }

    let serial = dt.as_f64();
    match dt.as_datetime() {
        Some(datetime) if serial < 1.0 => CellValue::Time(datetime.time()),
        Some(datetime) if serial.fract() == 0.0 => CellValue::Date(datetime.date()),
        Some(datetime) => CellValue::DateTime(datetime),
        None => CellValue::Text(serial.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return CellValue::Time(t);
    }
    CellValue::Text(s.to_owned())
}

/// `H:MM:SS`, prefixed with `N day(s), ` once the span reaches a full day.
///
/// Days are floored, so a negative span is a negative day count plus a positive remainder:
/// `-1` second renders as `-1 day, 23:59:59`.
fn format_duration(total_seconds: i64) -> String {
    let days = total_seconds.div_euclid(86_400);
    let rem = total_seconds.rem_euclid(86_400);
    let body = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    match days {
        0 => body,
        1 | -1 => format!("{} day, {}", days, body),
        n => format!("{} days, {}", n, body),
    }
}
