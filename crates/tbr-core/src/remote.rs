//! Remote book import
//!
//! Fetches a JSON list of book candidates from the configured endpoint
//! and normalizes it to `{title, author}` pairs. Two payload shapes are
//! accepted: a bare array of book objects, and an envelope whose
//! `results` array carries an `authors` list of `{name}` objects.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A book candidate as offered by the remote endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBook {
    /// Trimmed, non-empty title
    pub title: String,
    /// Trimmed author, if the payload carried one
    pub author: Option<String>,
}

/// Errors that can occur while fetching import candidates
#[derive(Error, Debug)]
pub enum ImportError {
    /// Request could not be built or the transfer failed
    #[error("Import request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Import endpoint returned HTTP {0}")]
    Status(u16),

    /// Body was not valid JSON
    #[error("Import payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    /// JSON was valid but not a recognized book list
    #[error("Import payload has an unexpected shape (expected a book list or a results envelope)")]
    Shape,
}

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Fetch and parse the candidate list from the import endpoint.
///
/// Any failure (network, non-success status, malformed payload) is the
/// import's failure; there is no retry and no partial result.
pub async fn fetch_candidates(url: &str) -> Result<Vec<RemoteBook>, ImportError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent(concat!("tbr/", env!("CARGO_PKG_VERSION")))
        .build()?;

    debug!("fetching import candidates from {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImportError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    let candidates = parse_candidates(&body)?;
    debug!("endpoint offered {} usable candidates", candidates.len());
    Ok(candidates)
}

/// Parse a response body into candidates.
///
/// Titles are trimmed and entries without a usable title are dropped.
pub fn parse_candidates(body: &str) -> Result<Vec<RemoteBook>, ImportError> {
    let value: Value = serde_json::from_str(body)?;

    let items = if let Some(list) = value.as_array() {
        list
    } else if let Some(list) = value.get("results").and_then(Value::as_array) {
        list
    } else {
        return Err(ImportError::Shape);
    };

    Ok(items.iter().filter_map(candidate_from_item).collect())
}

fn candidate_from_item(item: &Value) -> Option<RemoteBook> {
    let title = item.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }

    Some(RemoteBook {
        title: title.to_string(),
        author: author_from_item(item),
    })
}

/// Pull an author out of either payload shape.
///
/// The bare list carries `author` as a plain string; the envelope shape
/// carries `authors` as a list of `{name}` objects, joined with ", ".
fn author_from_item(item: &Value) -> Option<String> {
    if let Some(author) = item.get("author").and_then(Value::as_str) {
        let author = author.trim();
        if !author.is_empty() {
            return Some(author.to_string());
        }
    }

    if let Some(authors) = item.get("authors").and_then(Value::as_array) {
        let names: Vec<&str> = authors
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        if !names.is_empty() {
            return Some(names.join(", "));
        }
    }

    None
}
