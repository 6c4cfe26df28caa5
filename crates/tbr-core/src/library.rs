//! Collection state manager
//!
//! `Library` is the single source of truth the interactive surface
//! renders: the canonical book list, the busy flags, the last error and
//! the search/filter state. Every mutation writes to the store first
//! and patches the in-memory list only after the write succeeds, so the
//! visible list never drifts from what the database holds.
//!
//! Operations never return errors; failures land in the shared `error`
//! field for the next render, and the matching busy flag is always
//! cleared.

use std::collections::HashSet;

use anyhow::Context;
use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Book, BookStatus, StatusFilter};
use crate::remote::{self, RemoteBook};
use crate::store::BookStore;

/// In-memory mirror of the reading list plus its view state
pub struct Library {
    /// Owned store; all mutations go through it first
    store: BookStore,
    /// Endpoint for the remote import
    import_url: String,
    /// Canonical list, newest first
    books: Vec<Book>,
    /// True from construction until the first load completes
    loading: bool,
    /// True while a user-triggered reload runs
    refreshing: bool,
    /// True while an import runs
    importing: bool,
    /// Message from the last failed operation
    error: Option<String>,
    /// Live search text
    search_query: String,
    /// Active status filter
    status_filter: StatusFilter,
}

impl Library {
    /// Open a library over the configured store and import endpoint
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config))
    }

    /// Open a library for a specific configuration
    pub fn open_with_config(config: &Config) -> Self {
        Self::new(BookStore::open_with_config(config), config.import_url.clone())
    }

    /// Wrap an existing store
    pub fn new(store: BookStore, import_url: impl Into<String>) -> Self {
        Self {
            store,
            import_url: import_url.into(),
            books: Vec::new(),
            loading: true,
            refreshing: false,
            importing: false,
            error: None,
            search_query: String::new(),
            status_filter: StatusFilter::All,
        }
    }

    // ==================== View State ====================

    /// The canonical list, newest first
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Books matching the current search text and status filter,
    /// in canonical order
    pub fn visible_books(&self) -> Vec<&Book> {
        filter_books(&self.books, &self.search_query, self.status_filter)
    }

    /// True until the first load completes
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while a reload is in flight
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// True while an import is in flight
    pub fn is_importing(&self) -> bool {
        self.importing
    }

    /// Message from the last failed operation, until the next
    /// load/refresh/import clears it
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current search text
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Current status filter
    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    /// Update the search text
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Update the status filter
    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    // ==================== Operations ====================

    /// Initial load: fetch the full list from the store
    pub async fn load(&mut self) {
        self.loading = true;
        self.reload().await;
    }

    /// User-triggered reload
    pub async fn refresh(&mut self) {
        self.refreshing = true;
        self.reload().await;
    }

    async fn reload(&mut self) {
        self.error = None;
        match self.store.all().await {
            Ok(books) => {
                debug!("loaded {} books", books.len());
                self.books = books;
            }
            Err(err) => {
                warn!("failed to load books: {}", err);
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
        self.refreshing = false;
    }

    /// Add a book and prepend it to the list.
    ///
    /// The title must already be validated; new books always start in
    /// planning.
    pub async fn add(&mut self, title: impl Into<String>, author: Option<String>) {
        match self.store.insert(title, author, BookStatus::Planning).await {
            Ok(book) => self.books.insert(0, book),
            Err(err) => {
                warn!("failed to add book: {}", err);
                self.error = Some(err.to_string());
            }
        }
    }

    /// Overwrite a book's title, author and status, then patch the
    /// matching list entry in place
    pub async fn edit(
        &mut self,
        id: i64,
        title: impl Into<String>,
        author: Option<String>,
        status: BookStatus,
    ) {
        let title = title.into();
        match self
            .store
            .update(id, title.clone(), author.clone(), status)
            .await
        {
            Ok(()) => {
                if let Some(book) = self.books.iter_mut().find(|b| b.id == id) {
                    book.title = title;
                    book.author = author;
                    book.status = status;
                }
            }
            Err(err) => {
                warn!("failed to edit book {}: {}", id, err);
                self.error = Some(err.to_string());
            }
        }
    }

    /// Advance a book one step along planning -> reading -> done.
    ///
    /// An id not in the current list is a silent no-op; the guard checks
    /// local state, not the store.
    pub async fn cycle_status(&mut self, id: i64) {
        let current = match self.books.iter().find(|b| b.id == id) {
            Some(book) => book.status,
            None => return,
        };
        let next = current.next();

        match self.store.update_status(id, next).await {
            Ok(()) => {
                if let Some(book) = self.books.iter_mut().find(|b| b.id == id) {
                    book.status = next;
                }
            }
            Err(err) => {
                warn!("failed to update status of book {}: {}", id, err);
                self.error = Some(err.to_string());
            }
        }
    }

    /// Delete a book and drop it from the list.
    ///
    /// An id not in the current list is a silent no-op.
    pub async fn remove(&mut self, id: i64) {
        if !self.books.iter().any(|b| b.id == id) {
            return;
        }

        match self.store.delete(id).await {
            Ok(()) => self.books.retain(|b| b.id != id),
            Err(err) => {
                warn!("failed to remove book {}: {}", id, err);
                self.error = Some(err.to_string());
            }
        }
    }

    /// Fetch candidates from the import endpoint and insert the ones not
    /// already on the list.
    ///
    /// Candidates are deduplicated case-insensitively against existing
    /// titles and within the batch, inserted concurrently (all forced to
    /// planning), and prepended in batch order. Any failure surfaces as a
    /// single aggregate error; rows inserted before a mid-batch failure
    /// stay in the store but the in-memory list is left untouched.
    pub async fn import_remote(&mut self) {
        self.importing = true;
        self.error = None;

        let fetched = remote::fetch_candidates(&self.import_url).await;
        let outcome = match fetched {
            Ok(candidates) => self.ingest(candidates).await,
            Err(err) => Err(err.to_string()),
        };

        match outcome {
            Ok(count) => info!("imported {} new books", count),
            Err(message) => {
                warn!("import failed: {}", message);
                self.error = Some(message);
            }
        }
        self.importing = false;
    }

    /// Insert deduplicated candidates and prepend them on full success
    async fn ingest(&mut self, candidates: Vec<RemoteBook>) -> Result<usize, String> {
        let fresh = dedup_candidates(candidates, &self.books);
        if fresh.is_empty() {
            return Ok(0);
        }

        let store = &self.store;
        let inserts = fresh.into_iter().map(|candidate| {
            store.insert(candidate.title, candidate.author, BookStatus::Planning)
        });
        let inserted = try_join_all(inserts).await.map_err(|err| err.to_string())?;

        let count = inserted.len();
        self.books.splice(0..0, inserted);
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &BookStore {
        &self.store
    }
}

/// Apply the search text and status filter to a list, keeping order.
///
/// A book is visible iff the trimmed query is empty or its title
/// contains the query case-insensitively, and its status passes the
/// filter.
pub fn filter_books<'a>(books: &'a [Book], query: &str, filter: StatusFilter) -> Vec<&'a Book> {
    let needle = query.trim().to_lowercase();
    books
        .iter()
        .filter(|book| {
            (needle.is_empty() || book.title.to_lowercase().contains(&needle))
                && filter.matches(book.status)
        })
        .collect()
}

/// Drop candidates whose title is already taken, case-insensitively.
///
/// A candidate is kept only if its title appears neither among the
/// existing books nor earlier in the same batch. Batch order is
/// preserved.
pub fn dedup_candidates(candidates: Vec<RemoteBook>, existing: &[Book]) -> Vec<RemoteBook> {
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|book| book.title.trim().to_lowercase())
        .collect();

    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.title.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const UNUSED_URL: &str = "http://unused.invalid/books";

    async fn test_library() -> Library {
        let mut library = Library::new(BookStore::in_memory(), UNUSED_URL);
        library.load().await;
        assert!(library.error().is_none());
        library
    }

    fn fixture_book(id: i64, title: &str, status: BookStatus) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn candidate(title: &str) -> RemoteBook {
        RemoteBook {
            title: title.to_string(),
            author: None,
        }
    }

    // ==================== Load ====================

    #[tokio::test]
    async fn test_load_populates_list_and_clears_flags() {
        let mut library = Library::new(BookStore::in_memory(), UNUSED_URL);
        assert!(library.is_loading());
        assert!(library.books().is_empty());

        library.load().await;

        assert!(!library.is_loading());
        assert!(!library.is_refreshing());
        assert!(library.error().is_none());
        assert_eq!(library.books().len(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_records_error_and_clears_flags() {
        let store = BookStore::in_memory();
        store.execute_raw("DROP TABLE books").await.unwrap();

        let mut library = Library::new(store, UNUSED_URL);
        library.load().await;

        assert!(!library.is_loading());
        assert!(library.error().is_some());
        assert!(library.books().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_changes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("reading_list.db");

        let mut library = Library::new(BookStore::at_path(&db_path), UNUSED_URL);
        library.load().await;
        assert_eq!(library.books().len(), 2);

        // Another handle on the same database writes behind our back
        let other = BookStore::at_path(&db_path);
        other
            .insert("Dune", None, BookStatus::Planning)
            .await
            .unwrap();

        library.refresh().await;
        assert!(!library.is_refreshing());
        assert_eq!(library.books().len(), 3);
        assert_eq!(library.books()[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_load() {
        let mut library = test_library().await;
        library.store().execute_raw("DROP TABLE books").await.unwrap();

        library.add("Dune", None).await;
        assert!(library.error().is_some());

        library
            .store()
            .execute_raw(
                "CREATE TABLE books (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    author TEXT,
                    status TEXT DEFAULT 'planning',
                    created_at INTEGER
                )",
            )
            .await
            .unwrap();

        library.load().await;
        assert!(library.error().is_none());
    }

    // ==================== Add ====================

    #[tokio::test]
    async fn test_add_prepends_new_book() {
        let mut library = test_library().await;

        library.add("Dune", Some("Frank Herbert".to_string())).await;

        assert!(library.error().is_none());
        assert_eq!(library.books().len(), 3);
        let first = &library.books()[0];
        assert_eq!(first.title, "Dune");
        assert_eq!(first.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(first.status, BookStatus::Planning);
    }

    #[tokio::test]
    async fn test_add_failure_leaves_list_untouched() {
        let mut library = test_library().await;
        let before = library.books().to_vec();

        library.store().execute_raw("DROP TABLE books").await.unwrap();
        library.add("Dune", None).await;

        assert!(library.error().is_some());
        assert_eq!(library.books(), before.as_slice());
    }

    // ==================== Edit ====================

    #[tokio::test]
    async fn test_edit_patches_single_entry_in_place() {
        let mut library = test_library().await;
        let id = library.books()[1].id;

        library
            .edit(
                id,
                "The Clean Coder",
                Some("Robert C. Martin".to_string()),
                BookStatus::Done,
            )
            .await;

        assert!(library.error().is_none());
        assert_eq!(library.books().len(), 2);
        let matches: Vec<&Book> = library.books().iter().filter(|b| b.id == id).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "The Clean Coder");
        assert_eq!(matches[0].status, BookStatus::Done);
        // Patched in place: position unchanged
        assert_eq!(library.books()[1].id, id);
    }

    #[tokio::test]
    async fn test_edit_failure_leaves_list_untouched() {
        let mut library = test_library().await;
        let id = library.books()[0].id;
        let before = library.books().to_vec();

        library.store().execute_raw("DROP TABLE books").await.unwrap();
        library.edit(id, "Changed", None, BookStatus::Done).await;

        assert!(library.error().is_some());
        assert_eq!(library.books(), before.as_slice());
    }

    // ==================== Cycle status ====================

    #[tokio::test]
    async fn test_cycle_status_advances_and_persists() {
        let mut library = test_library().await;
        // Seed list: "Atomic Habits" is first and currently reading
        let id = library.books()[0].id;
        assert_eq!(library.books()[0].status, BookStatus::Reading);

        library.cycle_status(id).await;
        assert_eq!(library.books()[0].status, BookStatus::Done);

        let stored = library.store().get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookStatus::Done);

        library.cycle_status(id).await;
        library.cycle_status(id).await;
        assert_eq!(library.books()[0].status, BookStatus::Reading);
    }

    #[tokio::test]
    async fn test_cycle_status_unknown_id_is_silent_noop() {
        let mut library = test_library().await;
        let before = library.books().to_vec();

        // The guard checks the in-memory list, so not even a broken
        // store can turn this into an error
        library.store().execute_raw("DROP TABLE books").await.unwrap();
        library.cycle_status(9999).await;

        assert!(library.error().is_none());
        assert_eq!(library.books(), before.as_slice());
    }

    #[tokio::test]
    async fn test_cycle_status_failure_leaves_status_untouched() {
        let mut library = test_library().await;
        let id = library.books()[0].id;

        library.store().execute_raw("DROP TABLE books").await.unwrap();
        library.cycle_status(id).await;

        assert!(library.error().is_some());
        assert_eq!(library.books()[0].status, BookStatus::Reading);
    }

    // ==================== Remove ====================

    #[tokio::test]
    async fn test_remove_drops_entry() {
        let mut library = test_library().await;
        let id = library.books()[0].id;

        library.remove(id).await;

        assert!(library.error().is_none());
        assert_eq!(library.books().len(), 1);
        assert!(library.books().iter().all(|b| b.id != id));
        assert!(library.store().get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_silent_noop() {
        let mut library = test_library().await;
        let before = library.books().to_vec();

        library.store().execute_raw("DROP TABLE books").await.unwrap();
        library.remove(9999).await;

        assert!(library.error().is_none());
        assert_eq!(library.books(), before.as_slice());
    }

    // ==================== Search and filter ====================

    #[tokio::test]
    async fn test_visible_books_composition() {
        // Seed list is exactly [Atomic Habits (reading), Clean Code (planning)]
        let mut library = test_library().await;

        library.set_search_query("clean");
        library.set_status_filter(StatusFilter::All);
        let visible = library.visible_books();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Clean Code");

        library.set_search_query("");
        library.set_status_filter(StatusFilter::Only(BookStatus::Reading));
        let visible = library.visible_books();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Atomic Habits");

        library.set_status_filter(StatusFilter::Only(BookStatus::Done));
        assert!(library.visible_books().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_trimmed_case_insensitive_substring() {
        let mut library = test_library().await;

        library.set_search_query("  ATOMIC  ");
        let visible = library.visible_books();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Atomic Habits");
    }

    #[test]
    fn test_filter_books_keeps_canonical_order() {
        let books = vec![
            fixture_book(3, "Dune", BookStatus::Planning),
            fixture_book(2, "Dune Messiah", BookStatus::Planning),
            fixture_book(1, "Emma", BookStatus::Done),
        ];

        let visible = filter_books(&books, "dune", StatusFilter::All);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].id, 3);
        assert_eq!(visible[1].id, 2);
    }

    // ==================== Import ====================

    #[tokio::test]
    async fn test_import_failure_records_error_and_clears_flag() {
        // Unparseable endpoint: fails in the request builder, no network
        let mut library = Library::new(BookStore::in_memory(), "not a url");
        library.load().await;
        let before = library.books().to_vec();

        library.import_remote().await;

        assert!(!library.is_importing());
        let message = library.error().unwrap();
        assert!(message.contains("Import request failed"));
        assert_eq!(library.books(), before.as_slice());
    }

    #[tokio::test]
    async fn test_ingest_prepends_batch_in_order_forced_to_planning() {
        let mut library = test_library().await;

        let count = library
            .ingest(vec![
                RemoteBook {
                    title: "Dune".to_string(),
                    author: Some("Frank Herbert".to_string()),
                },
                candidate("Emma"),
            ])
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(library.books().len(), 4);
        assert_eq!(library.books()[0].title, "Dune");
        assert_eq!(library.books()[1].title, "Emma");
        assert_eq!(library.books()[0].status, BookStatus::Planning);
        assert_eq!(library.books()[1].status, BookStatus::Planning);
    }

    #[tokio::test]
    async fn test_ingest_dedups_against_existing_and_batch() {
        let mut library = test_library().await;
        library.add("Dune", None).await;
        assert_eq!(library.books().len(), 3);

        let count = library
            .ingest(vec![candidate("dune"), candidate("DUNE")])
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(library.books().len(), 3);
    }

    #[tokio::test]
    async fn test_ingest_failure_leaves_list_untouched() {
        let mut library = test_library().await;
        let before = library.books().to_vec();

        library.store().execute_raw("DROP TABLE books").await.unwrap();
        let result = library.ingest(vec![candidate("Dune")]).await;

        assert!(result.is_err());
        assert_eq!(library.books(), before.as_slice());
    }

    #[test]
    fn test_dedup_candidates_is_case_insensitive() {
        let existing = vec![fixture_book(1, "Dune", BookStatus::Planning)];

        let survivors = dedup_candidates(
            vec![candidate("dune"), candidate("Emma"), candidate("EMMA")],
            &existing,
        );

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title, "Emma");
    }

    #[test]
    fn test_dedup_candidates_preserves_batch_order() {
        let survivors = dedup_candidates(
            vec![candidate("Zen"), candidate("Art"), candidate("zen")],
            &[],
        );

        let titles: Vec<&str> = survivors.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Zen", "Art"]);
    }
}
