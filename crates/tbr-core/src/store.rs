//! Reading list store
//!
//! `BookStore` owns the SQLite database behind the reading list. The
//! connection is opened lazily: the first operation performs open +
//! schema + seed exactly once, concurrent first callers await that same
//! in-flight initialization, and a failed initialization is memoized so
//! the process never races a second table-creation attempt.
//!
//! ## Usage
//!
//! ```ignore
//! let store = BookStore::open()?;
//!
//! let book = store.insert("Dune", None, BookStatus::Planning).await?;
//! let books = store.all().await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Book, BookStatus};
use crate::storage::{self, StorageError, StorageResult};

/// SQLite-backed store for Book records
pub struct BookStore {
    /// Database file location; `None` opens a private in-memory database
    db_path: Option<PathBuf>,
    /// Memoized initialization outcome, populated on first use
    conn: OnceCell<Result<Mutex<Connection>, Arc<StorageError>>>,
}

impl BookStore {
    /// Open the store at the configured database location
    ///
    /// The database itself is not touched until the first operation.
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config))
    }

    /// Open the store for a specific configuration
    pub fn open_with_config(config: &Config) -> Self {
        Self::at_path(config.db_path())
    }

    /// Open the store at an explicit database file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Open a private in-memory store (used in tests)
    pub fn in_memory() -> Self {
        Self {
            db_path: None,
            conn: OnceCell::new(),
        }
    }

    /// Get the initialized connection, running initialization on first call.
    ///
    /// Every caller observes the same outcome: the one connection, or the
    /// one error the first attempt produced.
    async fn handle(&self) -> StorageResult<&Mutex<Connection>> {
        let slot = self
            .conn
            .get_or_init(|| async { self.initialize().map(Mutex::new).map_err(Arc::new) })
            .await;

        match slot {
            Ok(mutex) => Ok(mutex),
            Err(source) => Err(StorageError::replayed(source)),
        }
    }

    /// Open the database, apply the schema and seed an empty table
    fn initialize(&self) -> StorageResult<Connection> {
        let conn = match &self.db_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        StorageError::CreateDirectory {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        storage::init_schema(&conn)?;
        if storage::seed_if_empty(&conn)? {
            debug!("seeded example books into a fresh database");
        }

        match &self.db_path {
            Some(path) => debug!("database ready at {}", path.display()),
            None => debug!("in-memory database ready"),
        }
        Ok(conn)
    }

    // ==================== Book Operations ====================

    /// Get every book, newest first (creation time descending, id breaks ties)
    pub async fn all(&self) -> StorageResult<Vec<Book>> {
        let conn = self.handle().await?.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, title, author, status, created_at FROM books
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BookRow {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                status: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row?.hydrate());
        }
        Ok(books)
    }

    /// Get a single book by id
    pub async fn get(&self, id: i64) -> StorageResult<Option<Book>> {
        let conn = self.handle().await?.lock().await;

        let row = conn
            .query_row(
                "SELECT id, title, author, status, created_at FROM books WHERE id = ?1",
                params![id],
                |row| {
                    Ok(BookRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        status: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(row.map(BookRow::hydrate))
    }

    /// Insert a new book stamped with the current time.
    ///
    /// The title must already be trimmed and non-empty; callers validate
    /// before submission. Returns the stored record including its id.
    pub async fn insert(
        &self,
        title: impl Into<String>,
        author: Option<String>,
        status: BookStatus,
    ) -> StorageResult<Book> {
        let title = title.into();
        let conn = self.handle().await?.lock().await;

        let created_ms = Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO books (title, author, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, author, status.as_str(), created_ms],
        )?;
        let id = conn.last_insert_rowid();
        debug!("inserted book {} '{}'", id, title);

        Ok(Book {
            id,
            title,
            author,
            status,
            created_at: DateTime::from_timestamp_millis(created_ms).unwrap_or_else(Utc::now),
        })
    }

    /// Update only the status column. Missing ids are a silent no-op.
    pub async fn update_status(&self, id: i64, status: BookStatus) -> StorageResult<()> {
        let conn = self.handle().await?.lock().await;

        let changed = conn.execute(
            "UPDATE books SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            debug!("status update for book {} matched no row", id);
        }
        Ok(())
    }

    /// Overwrite title, author and status. Missing ids are a silent no-op.
    pub async fn update(
        &self,
        id: i64,
        title: impl Into<String>,
        author: Option<String>,
        status: BookStatus,
    ) -> StorageResult<()> {
        let conn = self.handle().await?.lock().await;

        let changed = conn.execute(
            "UPDATE books SET title = ?1, author = ?2, status = ?3 WHERE id = ?4",
            params![title.into(), author, status.as_str(), id],
        )?;
        if changed == 0 {
            debug!("update for book {} matched no row", id);
        }
        Ok(())
    }

    /// Delete a book. Missing ids are a silent no-op.
    pub async fn delete(&self, id: i64) -> StorageResult<()> {
        let conn = self.handle().await?.lock().await;

        conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Run raw SQL against the store, initializing it first.
    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &str) -> StorageResult<()> {
        let conn = self.handle().await?.lock().await;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

/// Row as read back from SQLite, nullable columns not yet resolved
struct BookRow {
    id: i64,
    title: String,
    author: Option<String>,
    status: Option<String>,
    created_at: Option<i64>,
}

impl BookRow {
    /// Turn a raw row into a Book.
    ///
    /// The status and timestamp columns are nullable in the schema, so a
    /// row touched by an external tool can come back without them. Such
    /// rows read as planning / now rather than failing the whole list.
    fn hydrate(self) -> Book {
        let status = self
            .status
            .as_deref()
            .and_then(|raw| raw.parse::<BookStatus>().ok())
            .unwrap_or_else(|| {
                warn!("book {} has no usable status, reading it as planning", self.id);
                BookStatus::Planning
            });

        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            status,
            created_at: self
                .created_at
                .and_then(DateTime::from_timestamp_millis)
                .unwrap_or_else(Utc::now),
        }
    }
}
