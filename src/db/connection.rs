use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Schema applied idempotently on every connect. Category names carry no
/// UNIQUE constraint: the store is single-writer and duplicate creation
/// under concurrent writers is an accepted hazard.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    txn_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    amount      TEXT NOT NULL,
    type        TEXT NOT NULL CHECK (type IN ('income', 'expense', 'investment')),
    category_id INTEGER,
    description TEXT,
    tags        TEXT,
    user_id     TEXT
);
CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS budgets (
    category_id INTEGER NOT NULL,
    amount      TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    user_id     TEXT
);
";

pub fn establish_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch(SCHEMA)?;
    debug!(path = %db_path.display(), "connected to database");
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
