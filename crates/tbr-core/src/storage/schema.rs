//! SQLite schema for the reading list
//!
//! A single `books` table holds every record. The database runs in
//! write-ahead-log mode. A freshly created, empty table is seeded with
//! two example books so first launch shows a non-empty list.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Initialize journaling mode and create the books table if missing
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;

        -- Reading list records
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT,
            status TEXT DEFAULT 'planning',
            created_at INTEGER
        );
        "#,
    )
}

/// Seed the example books when the table is empty.
///
/// Runs after table creation so a brand-new database starts with content.
/// Returns whether the seed rows were inserted.
pub fn seed_if_empty(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(false);
    }

    // Both rows share one timestamp; the autoincrement id breaks the tie.
    let now = Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO books (title, author, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params!["Clean Code", "Robert C. Martin", "planning", now],
    )?;
    conn.execute(
        "INSERT INTO books (title, author, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params!["Atomic Habits", "James Clear", "reading", now],
    )?;

    Ok(true)
}
