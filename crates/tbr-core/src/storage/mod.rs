//! Storage layer
//!
//! Owns the SQLite schema and the storage error taxonomy. The
//! `BookStore` facade in `crate::store` drives this layer; nothing else
//! touches the database directly.

pub mod error;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, seed_if_empty};
