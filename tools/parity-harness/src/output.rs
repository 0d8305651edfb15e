//! JSON output for run reports

use crate::types::RunReport;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Write a run report to a JSON file, creating parent directories as needed
pub fn write_json(report: &RunReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(Error::Io)?;
    }

    let json = serde_json::to_string_pretty(report)?;
    fs::write(output_path, json).map_err(Error::Io)?;

    tracing::info!(path = %output_path.display(), "Wrote JSON report");
    Ok(())
}
