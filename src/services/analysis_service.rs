//! Analysis Service
//!
//! Loads the stored records, runs the derived-metrics engine over them
//! and summarizes database contents.

use crate::engine;
use crate::error::Result;
use crate::models::DerivedTable;
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;

/// Database summary data
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub record_count: i64,
    pub date_count: usize,
    pub spot_count: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub db_path: String,
}

/// Analysis service for business logic
pub struct AnalysisService;

impl AnalysisService {
    /// Compute the full derived table from everything stored
    pub fn derived_table(state: &AppState) -> Result<DerivedTable> {
        let records = state.db.load_all_records()?;
        let spots = state.db.load_spot_series()?;
        Ok(engine::compute(records, &spots))
    }

    /// Summarize what the database holds
    pub fn status(state: &AppState) -> Result<SummaryResult> {
        let (first_date, last_date) = state.db.date_range()?.unzip();

        Ok(SummaryResult {
            record_count: state.db.record_count()?,
            date_count: state.db.list_dates()?.len(),
            spot_count: state.db.spot_count()?,
            first_date,
            last_date,
            db_path: state.db_path.display().to_string(),
        })
    }
}
