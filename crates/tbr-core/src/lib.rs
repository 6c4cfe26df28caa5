//! tbr core library
//!
//! This crate provides the core functionality for tbr ("to be read"),
//! a local-first reading list manager.
//!
//! # Architecture
//!
//! - **SQLite**: single-table store, opened lazily and seeded on first run
//! - **Library**: in-memory mirror of the list plus view state, with a
//!   write-then-patch discipline against the store
//! - **Remote import**: one-shot fetch of book candidates from a JSON
//!   endpoint
//!
//! # Quick Start
//!
//! ```text
//! let mut library = Library::open()?;
//! library.load().await;
//!
//! library.add("Dune", Some("Frank Herbert".into())).await;
//! for book in library.visible_books() {
//!     println!("{}", book.title);
//! }
//! ```
//!
//! # Modules
//!
//! - `library`: collection state manager (main entry point)
//! - `store`: SQLite-backed book store
//! - `models`: Book, status and filter types
//! - `remote`: remote import adapter
//! - `storage`: schema and storage errors
//! - `config`: application configuration

pub mod config;
pub mod library;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;

pub use config::Config;
pub use library::{dedup_candidates, filter_books, Library};
pub use models::{clean_author, clean_title, Book, BookStatus, StatusFilter};
pub use remote::{fetch_candidates, parse_candidates, ImportError, RemoteBook};
pub use storage::{StorageError, StorageResult};
pub use store::BookStore;
