//! Data models for tbr
//!
//! Defines the Book record, its status enumeration, and the ephemeral
//! search/filter state used to derive the visible list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading status of a book, cycling planning -> reading -> done.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Planning,
    Reading,
    Done,
}

impl BookStatus {
    /// The next status in the fixed cycle.
    pub fn next(self) -> Self {
        match self {
            BookStatus::Planning => BookStatus::Reading,
            BookStatus::Reading => BookStatus::Done,
            BookStatus::Done => BookStatus::Planning,
        }
    }

    /// Stored column representation.
    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Planning => "planning",
            BookStatus::Reading => "reading",
            BookStatus::Done => "done",
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Planning
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(BookStatus::Planning),
            "reading" => Ok(BookStatus::Reading),
            "done" => Ok(BookStatus::Done),
            other => Err(format!(
                "invalid status '{}' (expected planning, reading or done)",
                other
            )),
        }
    }
}

/// A book on the reading list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Store-assigned identifier, stable for the record's lifetime
    pub id: i64,
    /// Display title, never empty
    pub title: String,
    /// Optional author
    pub author: Option<String>,
    /// Current reading status
    pub status: BookStatus,
    /// When this book was added; primary sort key
    pub created_at: DateTime<Utc>,
}

/// Status filter applied to the visible list. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Show every book
    #[default]
    All,
    /// Show only books with the given status
    Only(BookStatus),
}

impl StatusFilter {
    /// Whether a book with the given status passes this filter.
    pub fn matches(self, status: BookStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == wanted,
        }
    }

    /// The next filter in display order: all -> planning -> reading -> done -> all.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(BookStatus::Planning),
            StatusFilter::Only(BookStatus::Planning) => StatusFilter::Only(BookStatus::Reading),
            StatusFilter::Only(BookStatus::Reading) => StatusFilter::Only(BookStatus::Done),
            StatusFilter::Only(BookStatus::Done) => StatusFilter::All,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse::<BookStatus>().map(StatusFilter::Only).map_err(|_| {
                format!(
                    "invalid filter '{}' (expected all, planning, reading or done)",
                    s.trim()
                )
            })
        }
    }
}

/// Normalize a submitted title. Returns `None` when nothing remains after
/// trimming; a title must never reach the store empty.
pub fn clean_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a submitted author. Empty input becomes `None`.
pub fn clean_author(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
