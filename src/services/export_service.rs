//! Export Service
//!
//! Writes the derived table to CSV with the same three-row layered
//! header and cell formatting the terminal display uses. Missing values
//! export as empty cells rather than the display placeholder.

use crate::error::Result;
use crate::layout;
use crate::services::AnalysisService;
use crate::state::AppState;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Outcome of a CSV export
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub path: String,
    pub rows: usize,
}

/// Export service for business logic
pub struct ExportService;

impl ExportService {
    /// Export the full derived table to `path` as CSV
    pub fn export_csv(state: &AppState, path: &Path) -> Result<ExportResult> {
        info!("ExportService::export_csv - path={:?}", path);

        let table = AnalysisService::derived_table(state)?;
        let columns = layout::columns_for(None);

        let mut writer = csv::Writer::from_path(path)?;

        for layer in 0..3 {
            writer.write_record(columns.iter().map(|c| c.header[layer]))?;
        }

        for record in &table.records {
            writer.write_record(
                columns
                    .iter()
                    .map(|c| layout::format_cell((c.get)(record), c.format, "")),
            )?;
        }

        writer.flush()?;

        info!("Exported {} rows to {:?}", table.records.len(), path);

        Ok(ExportResult {
            path: path.display().to_string(),
            rows: table.records.len(),
        })
    }
}
