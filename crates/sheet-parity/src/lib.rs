//! sheet-parity - canonical rendering and comparison of spreadsheet extractor output
//!
//! Two spreadsheet readers only agree when their text output agrees byte for byte. This
//! crate provides the pieces needed to get both sides into the same canonical form and to
//! compare them.
//!
//! # Quick Start
//!
//! ```rust
//! use sheet_parity::{CellValue, compare, normalize_cell, serialize_row};
//!
//! # fn main() -> sheet_parity::Result<()> {
//! let row = [CellValue::Integer(1), CellValue::from("a,b"), CellValue::Boolean(true)];
//! let cells: Vec<String> = row.iter().map(normalize_cell).collect();
//! let line = serialize_row(&cells)?;
//! assert_eq!(line, "1,\"a,b\",TRUE\n");
//!
//! let result = compare(&line, "1,\"a,b\",TRUE\n");
//! assert!(result.matches);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **`normalize`**: one [`CellValue`] to its canonical text
//! - **`serializer`**: normalized rows to CSV lines
//! - **`extraction`**: calamine-backed reading of one sheet into canonical CSV
//! - **`parity`**: SHA-256 digests and first-divergence search
//! - **`test_fixtures`** (feature `test-fixtures`): XLSX writer for tests

#![deny(unsafe_code)]

pub mod error;
pub mod extraction;
pub mod normalize;
pub mod parity;
pub mod serializer;
pub mod types;

#[cfg(feature = "test-fixtures")]
pub mod test_fixtures;

pub use error::{Result, SheetParityError};
pub use extraction::read_sheet_to_csv;
pub use normalize::{normalize_cell, normalize_row};
pub use parity::{Divergence, LineSide, ParityResult, compare, sha256_hex};
pub use serializer::{RowSerializer, serialize_row};
pub use types::{CellValue, NormalizedCell, SheetCsv};
