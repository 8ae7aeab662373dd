//! Database connection management
//!
//! Every connection handed out here has foreign keys enforced.

#![allow(clippy::result_large_err)]

use crate::config::{DatabaseConfig, StoreConfig};
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path with default settings
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    configure(&conn, &DatabaseConfig::default())?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(from_rusqlite)?;
    Ok(conn)
}

/// Open the database described by a configuration
pub fn open_with_config(config: &StoreConfig) -> Result<Connection> {
    let conn = Connection::open(&config.database.path).map_err(from_rusqlite)?;
    configure(&conn, &config.database)?;
    tracing::debug!(
        path = %config.database.path.display(),
        journal_mode = config.database.journal_mode.as_pragma(),
        "database opened"
    );
    Ok(conn)
}

/// Apply connection-level settings
pub fn configure(conn: &Connection, config: &DatabaseConfig) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(from_rusqlite)?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute()
    let _mode: String = conn
        .query_row(
            &format!("PRAGMA journal_mode = {}", config.journal_mode.as_pragma()),
            [],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    Ok(())
}
