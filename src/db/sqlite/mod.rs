//! SQLite database module

mod migrations;
mod records;
mod spot;

use std::path::Path;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{IndexSpotSeries, OpenInterestRecord};

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (or create) the database at `path`.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Participant Records ==========

    /// Store a batch of records; see [`records::insert_batch`] for the
    /// duplicate-date policy.
    pub fn insert_records(
        &self,
        batch: &[OpenInterestRecord],
        replace: bool,
    ) -> Result<usize> {
        let mut conn = self.conn.lock();
        records::insert_batch(&mut conn, batch, replace)
    }

    /// Full raw table in canonical order.
    pub fn load_all_records(&self) -> Result<Vec<OpenInterestRecord>> {
        let conn = self.conn.lock();
        records::load_all(&conn)
    }

    /// Distinct stored dates, newest first.
    pub fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let conn = self.conn.lock();
        records::list_dates(&conn)
    }

    /// Drop one date from both tables; returns removed row counts.
    pub fn delete_date(&self, date: NaiveDate) -> Result<(usize, usize)> {
        let conn = self.conn.lock();
        let records_removed = records::delete_date(&conn, date)?;
        let spots_removed = spot::delete(&conn, date)?;
        Ok((records_removed, spots_removed))
    }

    pub fn record_count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        records::count(&conn)
    }

    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let conn = self.conn.lock();
        records::date_range(&conn)
    }

    // ========== Spot Prices ==========

    pub fn upsert_spot(&self, date: NaiveDate, price: f64, source: &str) -> Result<()> {
        let conn = self.conn.lock();
        spot::upsert(&conn, date, price, source)
    }

    pub fn load_spot_series(&self) -> Result<IndexSpotSeries> {
        let conn = self.conn.lock();
        spot::load_series(&conn)
    }

    pub fn get_spot(&self, date: NaiveDate) -> Result<Option<f64>> {
        let conn = self.conn.lock();
        spot::get(&conn, date)
    }

    pub fn spot_count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        spot::count(&conn)
    }
}
