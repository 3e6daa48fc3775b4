//! Participant-wise open interest file parsing
//!
//! Reads the exchange's daily CSV. The header sits on the first row, or on
//! the second when the file opens with a title row; the title text then
//! carries the trading date. Rows whose client type is not one of the five
//! known categories (footnotes, blank padding) are skipped with a warning.

pub mod dates;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{ClientType, OpenInterestRecord};

/// Where the trading date was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    DateColumn,
    TitleRow,
    Filename,
}

impl DateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateSource::DateColumn => "date column",
            DateSource::TitleRow => "title row",
            DateSource::Filename => "filename",
        }
    }
}

/// One parsed participant file.
#[derive(Debug)]
pub struct ParsedFile {
    pub records: Vec<OpenInterestRecord>,
    /// Distinct trading dates in the file, ascending.
    pub dates: Vec<NaiveDate>,
    pub source: DateSource,
}

/// Required count columns and where each lands on the record.
const FIELD_COLUMNS: [(&str, fn(&mut OpenInterestRecord, i64)); 14] = [
    ("future index long", |r, v| r.future_index_long = v),
    ("future index short", |r, v| r.future_index_short = v),
    ("future stock long", |r, v| r.future_stock_long = v),
    ("future stock short", |r, v| r.future_stock_short = v),
    ("option index call long", |r, v| r.option_index_call_long = v),
    ("option index put long", |r, v| r.option_index_put_long = v),
    ("option index call short", |r, v| {
        r.option_index_call_short = v
    }),
    ("option index put short", |r, v| r.option_index_put_short = v),
    ("option stock call long", |r, v| r.option_stock_call_long = v),
    ("option stock put long", |r, v| r.option_stock_put_long = v),
    ("option stock call short", |r, v| {
        r.option_stock_call_short = v
    }),
    ("option stock put short", |r, v| r.option_stock_put_short = v),
    ("total long contracts", |r, v| r.total_long_contracts = v),
    ("total short contracts", |r, v| r.total_short_contracts = v),
];

/// Parse a participant file from disk, using the filename as a date
/// fallback.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let file_name = path.file_name().and_then(|n| n.to_str()).map(str::to_owned);
    let file = File::open(path)?;
    parse_reader(file, file_name.as_deref())
}

/// Parse a participant file from any reader. `file_name` is only consulted
/// when neither the data nor a title row yields a date.
pub fn parse_reader<R: Read>(reader: R, file_name: Option<&str>) -> Result<ParsedFile> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.records() {
        rows.push(row?);
    }

    let header_row = rows
        .iter()
        .take(2)
        .position(|row| {
            row.iter()
                .any(|cell| norm(cell) == "client type")
        })
        .ok_or_else(|| AppError::Ingest("no 'Client Type' header in the first two rows".into()))?;

    let header = &rows[header_row];
    let client_idx = find_column(header, "client type")
        .ok_or_else(|| AppError::Ingest("missing 'Client Type' column".into()))?;
    let date_idx = find_column(header, "date");
    let mut field_idx = [0usize; 14];
    for (slot, (name, _)) in field_idx.iter_mut().zip(FIELD_COLUMNS.iter()) {
        *slot = find_column(header, name)
            .ok_or_else(|| AppError::Ingest(format!("missing '{name}' column")))?;
    }

    // Single-date fallbacks, used only when the data has no Date column.
    let title_date = if header_row == 1 {
        let title = rows[0].iter().collect::<Vec<_>>().join(" ");
        dates::from_title(&title)
    } else {
        None
    };
    let filename_date = file_name.and_then(dates::from_filename);
    let (file_date, fallback_source) = match (title_date, filename_date) {
        (Some(d), _) => (Some(d), DateSource::TitleRow),
        (None, Some(d)) => (Some(d), DateSource::Filename),
        (None, None) => (None, DateSource::Filename),
    };

    let mut records = Vec::new();
    for (offset, row) in rows[header_row + 1..].iter().enumerate() {
        let line = header_row + offset + 2;
        let client_cell = row.get(client_idx).unwrap_or("");
        let client_type = match ClientType::parse(client_cell) {
            Some(ct) => ct,
            None => {
                if !row.iter().all(|cell| cell.trim().is_empty()) {
                    warn!(line, value = client_cell, "skipping unrecognized client type");
                }
                continue;
            }
        };

        let date = match date_idx {
            Some(idx) => {
                let cell = row.get(idx).unwrap_or("");
                dates::parse_cell(cell).ok_or_else(|| {
                    AppError::Ingest(format!("line {line}: unparseable date '{cell}'"))
                })?
            }
            None => file_date.ok_or_else(|| {
                AppError::Ingest(
                    "no Date column, no 'as on' title date, no DDMMYYYY filename date".into(),
                )
            })?,
        };

        let mut record = OpenInterestRecord {
            date,
            client_type,
            future_index_long: 0,
            future_index_short: 0,
            future_stock_long: 0,
            future_stock_short: 0,
            option_index_call_long: 0,
            option_index_put_long: 0,
            option_index_call_short: 0,
            option_index_put_short: 0,
            option_stock_call_long: 0,
            option_stock_put_long: 0,
            option_stock_call_short: 0,
            option_stock_put_short: 0,
            total_long_contracts: 0,
            total_short_contracts: 0,
        };
        for (idx, (name, set)) in field_idx.iter().zip(FIELD_COLUMNS.iter()) {
            let cell = row.get(*idx).unwrap_or("");
            let value = parse_count(cell).ok_or_else(|| {
                AppError::Ingest(format!("line {line}: bad count in '{name}': '{cell}'"))
            })?;
            set(&mut record, value);
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(AppError::Ingest("no participant rows found".into()));
    }

    let dates: Vec<NaiveDate> = records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let source = if date_idx.is_some() {
        DateSource::DateColumn
    } else {
        fallback_source
    };

    Ok(ParsedFile {
        records,
        dates,
        source,
    })
}

fn find_column(header: &csv::StringRecord, name: &str) -> Option<usize> {
    header.iter().position(|cell| norm(cell) == name)
}

/// Lowercase with runs of whitespace collapsed.
fn norm(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Contract counts: integers, optionally comma-grouped, sometimes written
/// with a float tail by spreadsheet tools. Blank means zero.
fn parse_count(cell: &str) -> Option<i64> {
    let cleaned: String = cell.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < 9e18 => Some(f as i64),
        _ => None,
    }
}
