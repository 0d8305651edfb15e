//! Error types for sheet-parity.
//!
//! System errors (`Io`) bubble up unchanged; everything else is wrapped with a message
//! that names what was being read or written.
//!
//! # Example
//!
//! ```rust
//! use sheet_parity::{Result, SheetParityError};
//!
//! fn check_index(index: usize, sheet_count: usize) -> Result<()> {
//!     if index >= sheet_count {
//!         return Err(SheetParityError::validation(format!(
//!             "Sheet index {} out of range ({} sheets)",
//!             index, sheet_count
//!         )));
//!     }
//!     Ok(())
//! }
//! ```
use thiserror::Error;

/// Result type alias using `SheetParityError`.
pub type Result<T> = std::result::Result<T, SheetParityError>;

/// Main error type for sheet-parity operations.
///
/// # Variants
///
/// - `Io` - File system and I/O errors (always bubble up)
/// - `Parsing` - Workbook parsing errors (corrupt or unrecognised files)
/// - `Validation` - Invalid inputs such as an out-of-range sheet index
/// - `Serialization` - CSV encoding errors
#[derive(Debug, Error)]
pub enum SheetParityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<calamine::Error> for SheetParityError {
    fn from(err: calamine::Error) -> Self {
        match err {
            // Real IO errors stay IO errors
            calamine::Error::Io(io_err) if io_err.kind() != std::io::ErrorKind::InvalidData => Self::Io(io_err),
            other => SheetParityError::Parsing {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<csv::Error> for SheetParityError {
    fn from(err: csv::Error) -> Self {
        SheetParityError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        paste::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl SheetParityError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
}
