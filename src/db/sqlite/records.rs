//! Participant record storage

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::{AppError, Result};
use crate::models::{ClientType, OpenInterestRecord};

/// Store a batch of records in one transaction.
///
/// Dates already present are a conflict: the whole batch is rejected unless
/// `replace` is set, in which case the conflicting dates are deleted and
/// rewritten atomically.
pub fn insert_batch(
    conn: &mut Connection,
    records: &[OpenInterestRecord],
    replace: bool,
) -> Result<usize> {
    let tx = conn.transaction()?;

    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let mut conflicts = Vec::new();
    for date in &dates {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM oi_records WHERE date = ?1)",
            params![date],
            |row| row.get(0),
        )?;
        if exists {
            conflicts.push(*date);
        }
    }
    if !conflicts.is_empty() {
        if !replace {
            let listed: Vec<String> = conflicts.iter().map(|d| d.to_string()).collect();
            return Err(AppError::Validation(format!(
                "data already stored for {}; pass --replace to overwrite",
                listed.join(", ")
            )));
        }
        for date in &conflicts {
            tx.execute("DELETE FROM oi_records WHERE date = ?1", params![date])?;
        }
    }

    let mut stmt = tx.prepare(
        "INSERT INTO oi_records (
            date, client_type,
            future_index_long, future_index_short,
            future_stock_long, future_stock_short,
            option_index_call_long, option_index_put_long,
            option_index_call_short, option_index_put_short,
            option_stock_call_long, option_stock_put_long,
            option_stock_call_short, option_stock_put_short,
            total_long_contracts, total_short_contracts
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )?;
    for rec in records {
        stmt.execute(params![
            rec.date,
            rec.client_type.as_str(),
            rec.future_index_long,
            rec.future_index_short,
            rec.future_stock_long,
            rec.future_stock_short,
            rec.option_index_call_long,
            rec.option_index_put_long,
            rec.option_index_call_short,
            rec.option_index_put_short,
            rec.option_stock_call_long,
            rec.option_stock_put_long,
            rec.option_stock_call_short,
            rec.option_stock_put_short,
            rec.total_long_contracts,
            rec.total_short_contracts,
        ])?;
    }
    drop(stmt);
    tx.commit()?;

    tracing::info!("Stored {} records across {} dates", records.len(), dates.len());
    Ok(records.len())
}

/// Load the full raw table in canonical order.
pub fn load_all(conn: &Connection) -> Result<Vec<OpenInterestRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, client_type,
                future_index_long, future_index_short,
                future_stock_long, future_stock_short,
                option_index_call_long, option_index_put_long,
                option_index_call_short, option_index_put_short,
                option_stock_call_long, option_stock_put_long,
                option_stock_call_short, option_stock_put_short,
                total_long_contracts, total_short_contracts
         FROM oi_records
         ORDER BY date DESC, client_type ASC",
    )?;

    let records = stmt
        .query_map([], |row| {
            let ct_text: String = row.get(1)?;
            let client_type = ClientType::parse(&ct_text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("unknown client type '{ct_text}'").into(),
                )
            })?;
            Ok(OpenInterestRecord {
                date: row.get(0)?,
                client_type,
                future_index_long: row.get(2)?,
                future_index_short: row.get(3)?,
                future_stock_long: row.get(4)?,
                future_stock_short: row.get(5)?,
                option_index_call_long: row.get(6)?,
                option_index_put_long: row.get(7)?,
                option_index_call_short: row.get(8)?,
                option_index_put_short: row.get(9)?,
                option_stock_call_long: row.get(10)?,
                option_stock_put_long: row.get(11)?,
                option_stock_call_short: row.get(12)?,
                option_stock_put_short: row.get(13)?,
                total_long_contracts: row.get(14)?,
                total_short_contracts: row.get(15)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!("Loaded {} records from database", records.len());
    Ok(records)
}

/// Distinct stored dates, newest first.
pub fn list_dates(conn: &Connection) -> Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare("SELECT DISTINCT date FROM oi_records ORDER BY date DESC")?;
    let dates = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(dates)
}

/// Delete every record of one date; returns the number of rows removed.
pub fn delete_date(conn: &Connection, date: NaiveDate) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM oi_records WHERE date = ?1", params![date])?;
    Ok(deleted)
}

pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM oi_records", [], |row| row.get(0))?;
    Ok(count)
}

/// Oldest and newest stored date, if any.
pub fn date_range(conn: &Connection) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let range: (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
        "SELECT MIN(date), MAX(date) FROM oi_records",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(match range {
        (Some(min), Some(max)) => Some((min, max)),
        _ => None,
    })
}
