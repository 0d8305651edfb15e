//! Cell value normalization.
//!
//! Maps a [`CellValue`] to the exact text a spreadsheet engine displays for it, so two
//! extractors that decode `3.0` as an integer and as a float still agree byte for byte.
//!
//! | Value                  | Rendering                                   |
//! |------------------------|---------------------------------------------|
//! | empty                  | `""`                                        |
//! | boolean                | `TRUE` / `FALSE`                            |
//! | integer                | decimal                                     |
//! | NaN / +inf / -inf      | `#NUM!` / `#DIV/0!` / `-#DIV/0!`            |
//! | integral real < 1e15   | decimal, no `.0`                            |
//! | other real             | 6 fractional digits, trailing zeros removed |
//! | datetime / date / time | ISO-8601, whole seconds                     |

use std::fmt::Write as FmtWrite;

use crate::types::{CellValue, NormalizedCell};

const NAN_TOKEN: &str = "#NUM!";
const POS_INF_TOKEN: &str = "#DIV/0!";
const NEG_INF_TOKEN: &str = "-#DIV/0!";

/// Reals at or above this magnitude keep the fixed-point rendering even when integral.
const INTEGRAL_LIMIT: f64 = 1e15;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Normalize one cell value into its canonical text.
pub fn normalize_cell(value: &CellValue) -> NormalizedCell {
    let mut buffer = String::new();
    normalize_cell_into(&mut buffer, value);
    buffer
}

/// Normalize a whole row.
pub fn normalize_row<'a, I>(row: I) -> Vec<NormalizedCell>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    row.into_iter().map(normalize_cell).collect()
}

/// Append the canonical text of `value` to `buffer`.
#[inline]
pub fn normalize_cell_into(buffer: &mut String, value: &CellValue) {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => buffer.push_str(s),
        CellValue::Boolean(b) => buffer.push_str(if *b { "TRUE" } else { "FALSE" }),
        CellValue::Integer(i) => {
            let _ = write!(buffer, "{}", i);
        }
        CellValue::Real(f) => format_real_into(buffer, *f),
        // chrono's %S never prints fractional seconds, which gives the truncation
        CellValue::DateTime(dt) => {
            let _ = write!(buffer, "{}", dt.format(DATETIME_FORMAT));
        }
        CellValue::Date(d) => {
            let _ = write!(buffer, "{}", d.format(DATE_FORMAT));
        }
        CellValue::Time(t) => {
            let _ = write!(buffer, "{}", t.format(TIME_FORMAT));
        }
    }
}

fn format_real_into(buffer: &mut String, value: f64) {
    if value.is_nan() {
        buffer.push_str(NAN_TOKEN);
        return;
    }
    if value.is_infinite() {
        buffer.push_str(if value > 0.0 { POS_INF_TOKEN } else { NEG_INF_TOKEN });
        return;
    }

    if value.fract() == 0.0 && value.abs() < INTEGRAL_LIMIT {
        // |value| < 1e15 fits in i64 exactly; -0.0 becomes "0"
        let _ = write!(buffer, "{}", value as i64);
        return;
    }

    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        buffer.push('0');
    } else {
        buffer.push_str(trimmed);
    }
}

impl CellValue {
    /// Canonical text of this value. Shorthand for [`normalize_cell`].
    pub fn normalize(&self) -> NormalizedCell {
        normalize_cell(self)
    }
}
