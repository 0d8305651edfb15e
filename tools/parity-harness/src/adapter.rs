//! Sheet adapter trait
//!
//! Both extractors under comparison implement [`SheetAdapter`], so the runner never needs to
//! know whether a sheet was rendered in-process or by a child process.

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Text output of one adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRender {
    /// Canonical CSV of the sheet
    pub text: String,

    /// Row count, when the adapter knows it
    pub row_count: Option<usize>,

    /// Raw timing diagnostics reported by the extractor, if any
    pub diagnostics: Option<String>,
}

/// Renders one sheet of a workbook as canonical CSV
#[async_trait]
pub trait SheetAdapter: Send + Sync {
    /// Name used as the key prefix in the report (e.g. `calamine` in `calamine_sec=`)
    fn name(&self) -> &str;

    /// Render sheet `sheet_index` (zero-based) of `file_path`
    ///
    /// # Errors
    ///
    /// Any error is fatal for the whole run.
    async fn render(&self, file_path: &Path, sheet_index: usize) -> Result<SheetRender>;

    /// Called once before the first round
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last round
    async fn teardown(&self) -> Result<()> {
        Ok(())
    }
}
