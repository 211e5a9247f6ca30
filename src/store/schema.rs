//! SQLite schema for the observation store.
//!
//! The ISD source format carries a much larger set of optional observation
//! fields (hourly precipitation, sky cover, soil/frost/ice observations,
//! remarks, equipment diagnostics, ...). Those columns are intentionally
//! absent here: nothing in the insert/select paths is wired to them, so the
//! schema only declares what the loader actually persists.

use crate::error::Result;
use rusqlite::Connection;

/// Create both tables if they do not exist. Idempotent.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS stations (
            id TEXT PRIMARY KEY,
            name TEXT,
            longitude REAL,
            latitude REAL,
            elevation REAL,
            callSign TEXT
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS measurements (
            id TEXT PRIMARY KEY,
            station TEXT,
            date TEXT,
            reportType TEXT,
            qualityControlFlag TEXT,
            wind TEXT,
            cloudCeiling REAL,
            visibilityDistance REAL,
            temperature REAL,
            dewPoints REAL,
            seaLevelPressure REAL
        )
        "#,
        [],
    )?;

    Ok(())
}

/// Drop all persisted state ahead of a fresh run.
pub fn drop_all(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS measurements", [])?;
    conn.execute("DROP TABLE IF EXISTS stations", [])?;

    Ok(())
}
