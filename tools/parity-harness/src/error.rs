//! Error types for the parity harness

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for parity harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a parity run
///
/// Every variant is fatal: a round either completes for both adapters or the run stops.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// In-process library error (bad file, bad sheet index, corrupt workbook)
    #[error(transparent)]
    Library(#[from] sheet_parity::SheetParityError),

    /// Adapter extraction error
    #[error("Adapter '{adapter}' failed on {file}: {message}")]
    Extraction {
        adapter: String,
        file: PathBuf,
        message: String,
    },

    /// Subject process could not be launched or exited unsuccessfully
    #[error("Subprocess error: {0}")]
    Subprocess(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_message() {
        let err = Error::Extraction {
            adapter: "turboxl".to_string(),
            file: PathBuf::from("/tmp/book.xlsx"),
            message: "exit code 2".to_string(),
        };
        assert_eq!(err.to_string(), "Adapter 'turboxl' failed on /tmp/book.xlsx: exit code 2");
    }

    #[test]
    fn test_library_error_is_transparent() {
        let err: Error = sheet_parity::SheetParityError::validation("Sheet index 9 out of range").into();
        assert_eq!(err.to_string(), "Validation error: Sheet index 9 out of range");
    }
}
