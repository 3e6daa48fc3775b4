//! Ingest Service
//!
//! Parses participant-wise open interest files and stores the records.
//! Called by the CLI ingest command.

use crate::error::{AppError, Result};
use crate::ingest;
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of a file ingest
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    /// Distinct trading dates in the file, ascending
    pub dates: Vec<NaiveDate>,
    /// Where the trading date came from: "date column", "title row" or "filename"
    pub date_source: String,
    pub replaced: bool,
    /// Dates with fewer than the full set of participant rows
    pub gaps: Vec<String>,
}

impl IngestReport {
    /// Newest trading date in the ingested file
    pub fn newest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Ingest service for business logic
pub struct IngestService;

impl IngestService {
    /// Parse `path` and store its records.
    ///
    /// With `replace` set, dates already present are overwritten instead of
    /// rejected. With `strict` set, structurally incomplete dates abort the
    /// ingest instead of being reported as warnings.
    pub fn ingest_file(
        state: &AppState,
        path: &Path,
        replace: bool,
        strict: bool,
    ) -> Result<IngestReport> {
        info!("IngestService::ingest_file - path={:?}", path);

        let parsed = ingest::parse_file(path)?;

        let gaps = crate::engine::normalizer::structural_gaps(&parsed.records);
        let gap_lines: Vec<String> = gaps.iter().map(|g| g.to_string()).collect();

        if !gaps.is_empty() {
            if strict {
                return Err(AppError::Structural(format!(
                    "Incomplete participant data: {}",
                    gap_lines.join("; ")
                )));
            }
            for line in &gap_lines {
                warn!("{}", line);
            }
        }

        let inserted = state.db.insert_records(&parsed.records, replace)?;

        info!(
            "Ingested {} records across {} dates from {:?}",
            inserted,
            parsed.dates.len(),
            path
        );

        Ok(IngestReport {
            inserted,
            dates: parsed.dates,
            date_source: parsed.source.as_str().to_string(),
            replaced: replace,
            gaps: gap_lines,
        })
    }

    /// Delete one trading date from both the record and spot tables.
    ///
    /// Returns (records deleted, spot prices deleted).
    pub fn remove_date(state: &AppState, date: NaiveDate) -> Result<(usize, usize)> {
        info!("IngestService::remove_date - date={}", date);

        let (records, spots) = state.db.delete_date(date)?;

        if records == 0 && spots == 0 {
            return Err(AppError::NotFound(format!("Nothing stored for {}", date)));
        }

        Ok((records, spots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const FULL_DAY: &str = "\
Date,Client Type,Future Index Long,Future Index Short,Future Stock Long,Future Stock Short,Option Index Call Long,Option Index Put Long,Option Index Call Short,Option Index Put Short,Option Stock Call Long,Option Stock Put Long,Option Stock Call Short,Option Stock Put Short,Total Long Contracts,Total Short Contracts
05-12-2025,Client,1000,700,500,350,100,70,50,35,10,7,5,3,1665,1095
05-12-2025,DII,2000,1500,1000,750,200,150,100,75,20,15,10,7,3330,2332
05-12-2025,FII,3000,2500,1500,1250,300,250,150,125,30,25,15,12,4995,3912
05-12-2025,Pro,500,0,250,0,50,0,25,0,5,0,2,0,830,2
05-12-2025,TOTAL,6500,4700,3250,2350,650,470,325,235,65,47,32,22,10822,9341
";

    const MISSING_DII: &str = "\
Date,Client Type,Future Index Long,Future Index Short,Future Stock Long,Future Stock Short,Option Index Call Long,Option Index Put Long,Option Index Call Short,Option Index Put Short,Option Stock Call Long,Option Stock Put Long,Option Stock Call Short,Option Stock Put Short,Total Long Contracts,Total Short Contracts
05-12-2025,Client,1000,700,500,350,100,70,50,35,10,7,5,3,1665,1095
05-12-2025,FII,3000,2500,1500,1250,300,250,150,125,30,25,15,12,4995,3912
05-12-2025,Pro,500,0,250,0,50,0,25,0,5,0,2,0,830,2
05-12-2025,TOTAL,6500,4700,3250,2350,650,470,325,235,65,47,32,22,10822,9341
";

    #[test]
    fn test_ingest_full_day() {
        let state = AppState::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "fao_participant_oi_05122025.csv", FULL_DAY);

        let report = IngestService::ingest_file(&state, &path, false, false).unwrap();

        assert_eq!(report.inserted, 5);
        assert_eq!(report.dates.len(), 1);
        assert_eq!(report.date_source, "date column");
        assert!(report.gaps.is_empty());
        assert_eq!(state.db.record_count().unwrap(), 5);
    }

    #[test]
    fn test_duplicate_date_rejected_then_replaced() {
        let state = AppState::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "oi.csv", FULL_DAY);

        IngestService::ingest_file(&state, &path, false, false).unwrap();
        let err = IngestService::ingest_file(&state, &path, false, false).unwrap_err();
        assert!(err.to_string().contains("2025-12-05"));

        let report = IngestService::ingest_file(&state, &path, true, false).unwrap();
        assert_eq!(report.inserted, 5);
        assert_eq!(state.db.record_count().unwrap(), 5);
    }

    #[test]
    fn test_incomplete_day_warns_but_ingests() {
        let state = AppState::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "oi.csv", MISSING_DII);

        let report = IngestService::ingest_file(&state, &path, false, false).unwrap();

        assert_eq!(report.inserted, 4);
        assert_eq!(report.gaps.len(), 1);
        assert!(report.gaps[0].contains("DII"));
    }

    #[test]
    fn test_incomplete_day_fails_strict() {
        let state = AppState::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "oi.csv", MISSING_DII);

        let err = IngestService::ingest_file(&state, &path, false, true).unwrap_err();
        assert!(matches!(err, AppError::Structural(_)));
        assert_eq!(state.db.record_count().unwrap(), 0);
    }

    #[test]
    fn test_remove_date_clears_records_and_spot() {
        let state = AppState::in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "oi.csv", FULL_DAY);
        IngestService::ingest_file(&state, &path, false, false).unwrap();
        let d = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        state.db.upsert_spot(d, 24_675.0, "manual").unwrap();

        let (records, spots) = IngestService::remove_date(&state, d).unwrap();

        assert_eq!(records, 5);
        assert_eq!(spots, 1);
        assert_eq!(state.db.record_count().unwrap(), 0);
    }

    #[test]
    fn test_remove_unknown_date_is_not_found() {
        let state = AppState::in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();

        let err = IngestService::remove_date(&state, d).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_newest_date_is_last() {
        let report = IngestReport {
            inserted: 10,
            dates: vec![
                NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
            ],
            date_source: "date column".to_string(),
            replaced: false,
            gaps: vec![],
        };
        assert_eq!(
            report.newest_date(),
            Some(NaiveDate::from_ymd_opt(2025, 12, 5).unwrap())
        );
    }
}
