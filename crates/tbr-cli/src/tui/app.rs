//! Application state and logic

use std::time::{Duration, Instant};

use tbr_core::{clean_author, clean_title, Book, BookStatus, Library};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Live search editing (after pressing /)
    Search,
    /// Add or edit form is open
    Form,
    /// Delete confirmation overlay
    Confirm,
}

/// Which form field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
}

impl FormField {
    /// The other field (the form only has two)
    pub fn toggle(self) -> Self {
        match self {
            FormField::Title => FormField::Author,
            FormField::Author => FormField::Title,
        }
    }
}

/// State of the add/edit form
pub struct BookForm {
    /// Target book for an edit; `None` means a new book
    pub id: Option<i64>,
    /// Status carried through an edit unchanged
    pub status: BookStatus,
    pub title: String,
    pub author: String,
    pub focus: FormField,
    /// Validation message shown under the fields
    pub error: Option<String>,
}

impl BookForm {
    fn blank() -> Self {
        Self {
            id: None,
            status: BookStatus::Planning,
            title: String::new(),
            author: String::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    fn for_book(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            status: book.status,
            title: book.title.clone(),
            author: book.author.clone().unwrap_or_default(),
            focus: FormField::Title,
            error: None,
        }
    }

    /// Whether this form edits an existing book
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// The buffer of the focused field
    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
        }
    }
}

/// Application state
pub struct App {
    /// The collection this TUI renders
    pub library: Library,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Selection index into the visible list
    pub selected: usize,
    /// Search input buffer, pushed into the library on every keystroke
    pub search_input: String,
    /// Add/edit form state while in `InputMode::Form`
    pub form: Option<BookForm>,
    /// Book id awaiting confirmation while in `InputMode::Confirm`
    pub pending_delete: Option<i64>,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Create the app around a library that has not loaded yet
    pub fn new(library: Library) -> Self {
        Self {
            library,
            should_quit: false,
            input_mode: InputMode::Normal,
            selected: 0,
            search_input: String::new(),
            form: None,
            pending_delete: None,
            status_message: None,
            status_message_time: None,
            show_help: false,
        }
    }

    /// Initial data load
    pub async fn load(&mut self) {
        self.library.load().await;
        self.clamp_selection();
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ==================== Selection ====================

    /// Number of books the list currently shows
    pub fn visible_len(&self) -> usize {
        self.library.visible_books().len()
    }

    /// The currently selected book
    pub fn selected_book(&self) -> Option<&Book> {
        self.library.visible_books().get(self.selected).copied()
    }

    /// Move selection up
    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection down
    pub fn move_down(&mut self) {
        if self.selected + 1 < self.visible_len() {
            self.selected += 1;
        }
    }

    /// Keep the selection inside the visible list after it changes
    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    // ==================== Search and filter ====================

    /// Enter search mode, editing from the current query
    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.library.search_query().to_string();
    }

    /// Append to the search text; the list narrows immediately
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.apply_search();
    }

    /// Delete the last search character
    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        self.library.set_search_query(self.search_input.clone());
        self.clamp_selection();
    }

    /// Keep the query and return to normal mode
    pub fn accept_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Drop the query and return to normal mode
    pub fn cancel_search(&mut self) {
        self.search_input.clear();
        self.library.set_search_query("");
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    /// Cycle the status filter one step
    pub fn cycle_filter(&mut self) {
        let next = self.library.status_filter().next();
        self.library.set_status_filter(next);
        self.clamp_selection();
    }

    // ==================== Forms ====================

    /// Open the add form, unless a load or import is still running
    pub fn open_add_form(&mut self) {
        if self.library.is_loading() || self.library.is_importing() {
            self.set_status("Busy, try again in a moment");
            return;
        }
        self.form = Some(BookForm::blank());
        self.input_mode = InputMode::Form;
    }

    /// Open the edit form prefilled from the selected book
    pub fn open_edit_form(&mut self) {
        let form = match self.selected_book() {
            Some(book) => BookForm::for_book(book),
            None => return,
        };
        self.form = Some(form);
        self.input_mode = InputMode::Form;
    }

    /// Close the form without saving
    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Switch focus between the form fields
    pub fn toggle_form_focus(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.focus = form.focus.toggle();
        }
    }

    /// Type into the focused form field
    pub fn push_form_char(&mut self, c: char) {
        if let Some(form) = self.form.as_mut() {
            form.field_mut().push(c);
        }
    }

    /// Delete the last character of the focused form field
    pub fn pop_form_char(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.field_mut().pop();
        }
    }

    /// Submit the form: add a new book or apply an edit.
    ///
    /// An empty title keeps the form open with a validation message.
    pub async fn submit_form(&mut self) {
        let Some(mut form) = self.form.take() else {
            return;
        };

        let Some(title) = clean_title(&form.title) else {
            form.error = Some("Title must not be empty".to_string());
            self.form = Some(form);
            return;
        };
        let author = clean_author(&form.author);

        match form.id {
            Some(id) => {
                self.library.edit(id, title.clone(), author, form.status).await;
                if self.library.error().is_none() {
                    self.set_status(format!("Updated '{}'", title));
                }
            }
            None => {
                self.library.add(title.clone(), author).await;
                if self.library.error().is_none() {
                    self.set_status(format!("Added '{}'", title));
                }
            }
        }

        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    // ==================== Book operations ====================

    /// Advance the selected book one status step
    pub async fn cycle_selected(&mut self) {
        let Some(id) = self.selected_book().map(|b| b.id) else {
            return;
        };

        self.library.cycle_status(id).await;

        let message = self
            .library
            .books()
            .iter()
            .find(|b| b.id == id)
            .map(|b| format!("'{}' is now {}", b.title, b.status));
        if self.library.error().is_none() {
            if let Some(message) = message {
                self.set_status(message);
            }
        }
        self.clamp_selection();
    }

    /// Ask before deleting the selected book
    pub fn request_delete(&mut self) {
        let Some(id) = self.selected_book().map(|b| b.id) else {
            return;
        };
        self.pending_delete = Some(id);
        self.input_mode = InputMode::Confirm;
    }

    /// Title shown in the confirmation overlay
    pub fn pending_delete_title(&self) -> Option<String> {
        let id = self.pending_delete?;
        self.library
            .books()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.title.clone())
    }

    /// Keep the book and leave the confirmation overlay
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
    }

    /// Delete the pending book
    pub async fn confirm_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(id) = self.pending_delete.take() else {
            return;
        };

        let title = self
            .library
            .books()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.title.clone());

        self.library.remove(id).await;

        if self.library.error().is_none() {
            if let Some(title) = title {
                self.set_status(format!("Removed '{}'", title));
            }
        }
        self.clamp_selection();
    }

    /// Reload the list from the store
    pub async fn reload(&mut self) {
        self.library.refresh().await;
        if self.library.error().is_none() {
            self.set_status(format!("{} book(s)", self.library.books().len()));
        }
        self.clamp_selection();
    }

    /// Run the remote import
    pub async fn import(&mut self) {
        let before = self.library.books().len();
        self.library.import_remote().await;
        if self.library.error().is_none() {
            let added = self.library.books().len() - before;
            self.set_status(format!("Imported {} new book(s)", added));
        }
        self.clamp_selection();
    }
}
