//! Index spot price storage

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::IndexSpotSeries;

/// Insert or update the close for one date.
pub fn upsert(conn: &Connection, date: NaiveDate, price: f64, source: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO spot_prices (date, price, source) VALUES (?1, ?2, ?3)
         ON CONFLICT(date) DO UPDATE SET
            price = excluded.price,
            source = excluded.source,
            updated_at = datetime('now')",
        params![date, price, source],
    )?;
    Ok(())
}

/// Load the whole series.
pub fn load_series(conn: &Connection) -> Result<IndexSpotSeries> {
    let mut stmt = conn.prepare("SELECT date, price FROM spot_prices")?;
    let series = stmt
        .query_map([], |row| Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, f64>(1)?)))?
        .collect::<std::result::Result<IndexSpotSeries, _>>()?;
    Ok(series)
}

pub fn get(conn: &Connection, date: NaiveDate) -> Result<Option<f64>> {
    let price = conn
        .query_row(
            "SELECT price FROM spot_prices WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(price)
}

/// Delete the close for one date; returns the number of rows removed.
pub fn delete(conn: &Connection, date: NaiveDate) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM spot_prices WHERE date = ?1", params![date])?;
    Ok(deleted)
}

pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM spot_prices", [], |row| row.get(0))?;
    Ok(count)
}
