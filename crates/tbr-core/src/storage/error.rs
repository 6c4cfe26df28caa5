//! Storage error handling
//!
//! Typed errors for store operations. Initialization runs once per
//! process; a failed initialization is memoized and replayed to every
//! later caller through the `Init` variant.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the data directory holding the database file
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A previous initialization attempt failed; it is not retried
    #[error("Database initialization failed: {0}")]
    Init(Arc<StorageError>),
}

impl StorageError {
    /// Wrap a memoized initialization failure for replay to a later caller.
    pub(crate) fn replayed(source: &Arc<StorageError>) -> Self {
        StorageError::Init(Arc::clone(source))
    }
}

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;
