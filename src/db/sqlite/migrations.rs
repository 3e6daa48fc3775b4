//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_oi_records", CREATE_OI_RECORDS_TABLE)?;
    run_migration(conn, "002_spot_prices", CREATE_SPOT_PRICES_TABLE)?;

    tracing::debug!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

/// One row per (date, client_type); dates are ISO-8601 text.
const CREATE_OI_RECORDS_TABLE: &str = r#"
CREATE TABLE oi_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    client_type TEXT NOT NULL,
    future_index_long INTEGER NOT NULL DEFAULT 0,
    future_index_short INTEGER NOT NULL DEFAULT 0,
    future_stock_long INTEGER NOT NULL DEFAULT 0,
    future_stock_short INTEGER NOT NULL DEFAULT 0,
    option_index_call_long INTEGER NOT NULL DEFAULT 0,
    option_index_put_long INTEGER NOT NULL DEFAULT 0,
    option_index_call_short INTEGER NOT NULL DEFAULT 0,
    option_index_put_short INTEGER NOT NULL DEFAULT 0,
    option_stock_call_long INTEGER NOT NULL DEFAULT 0,
    option_stock_put_long INTEGER NOT NULL DEFAULT 0,
    option_stock_call_short INTEGER NOT NULL DEFAULT 0,
    option_stock_put_short INTEGER NOT NULL DEFAULT 0,
    total_long_contracts INTEGER NOT NULL DEFAULT 0,
    total_short_contracts INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(date, client_type)
);
CREATE INDEX IF NOT EXISTS idx_oi_records_date ON oi_records(date);
"#;

const CREATE_SPOT_PRICES_TABLE: &str = r#"
CREATE TABLE spot_prices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    price REAL NOT NULL,
    source TEXT NOT NULL DEFAULT 'manual',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
