//! In-process calamine adapter
//!
//! Reads the workbook with the `sheet-parity` library in the harness's own process and
//! renders it through the shared normalizer and CSV serializer.

use crate::Result;
use crate::adapter::{SheetAdapter, SheetRender};
use async_trait::async_trait;
use sheet_parity::read_sheet_to_csv;
use std::path::Path;

/// Adapter that calls calamine directly
pub struct NativeAdapter {
    name: String,
}

impl NativeAdapter {
    /// Create a native adapter labelled `calamine`
    pub fn new() -> Self {
        Self::with_name("calamine")
    }

    /// Create a native adapter with a custom report label
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NativeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetAdapter for NativeAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, file_path: &Path, sheet_index: usize) -> Result<SheetRender> {
        // Runs on the calling thread so the measured time is the library's own
        let sheet = read_sheet_to_csv(file_path, sheet_index)?;

        tracing::debug!(
            adapter = %self.name,
            rows = sheet.row_count,
            bytes = sheet.text.len(),
            "Rendered sheet in-process"
        );

        Ok(SheetRender {
            text: sheet.text,
            row_count: Some(sheet.row_count),
            diagnostics: None,
        })
    }
}
