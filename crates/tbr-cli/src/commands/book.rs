//! Book command handlers

use anyhow::{bail, Context, Result};

use tbr_core::{clean_author, clean_title, filter_books, Book, BookStatus, BookStore, StatusFilter};

use crate::output::Output;
use crate::prompt::confirm;

/// Add a book to the reading list
pub async fn add(
    store: &BookStore,
    title: String,
    author: Option<String>,
    output: &Output,
) -> Result<()> {
    let Some(title) = clean_title(&title) else {
        bail!("Title must not be empty");
    };
    let author = author.as_deref().and_then(clean_author);

    let book = store
        .insert(title, author, BookStatus::Planning)
        .await
        .context("Failed to add book")?;

    output.success(&format!("Added '{}'", book.title));
    output.print_book(&book);

    Ok(())
}

/// List books, optionally narrowed by status and search text
pub async fn list(
    store: &BookStore,
    status: String,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let filter: StatusFilter = status.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let query = search.unwrap_or_default();

    let books = store.all().await.context("Failed to list books")?;
    let visible: Vec<Book> = filter_books(&books, &query, filter)
        .into_iter()
        .cloned()
        .collect();

    output.print_books(&visible);
    Ok(())
}

/// Edit a book
///
/// Flags not given keep their current value; an empty --author clears
/// the author. Unlike the store, a missing id is an error here: the id
/// came from `list`, so a typo should be loud.
pub async fn edit(
    store: &BookStore,
    id: i64,
    title: Option<String>,
    author: Option<String>,
    status: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut book = store
        .get(id)
        .await
        .context("Failed to look up book")?
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    if let Some(raw) = title {
        match clean_title(&raw) {
            Some(title) => book.title = title,
            None => bail!("Title must not be empty"),
        }
    }
    if let Some(raw) = author {
        book.author = clean_author(&raw);
    }
    if let Some(raw) = status {
        book.status = raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }

    store
        .update(book.id, book.title.clone(), book.author.clone(), book.status)
        .await
        .context("Failed to update book")?;

    output.success("Book updated");
    output.print_book(&book);

    Ok(())
}

/// Advance a book one step along planning -> reading -> done
pub async fn cycle_status(store: &BookStore, id: i64, output: &Output) -> Result<()> {
    let mut book = store
        .get(id)
        .await
        .context("Failed to look up book")?
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    let from = book.status;
    book.status = from.next();

    store
        .update_status(book.id, book.status)
        .await
        .context("Failed to update status")?;

    output.success(&format!("'{}' {} -> {}", book.title, from, book.status));
    output.print_book(&book);

    Ok(())
}

/// Remove a book
pub async fn remove(store: &BookStore, id: i64, force: bool, output: &Output) -> Result<()> {
    let book = store
        .get(id)
        .await
        .context("Failed to look up book")?
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    // Confirm deletion
    if !force && output.should_prompt() {
        match &book.author {
            Some(author) => println!("Remove '{}' by {}", book.title, author),
            None => println!("Remove '{}'", book.title),
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(id).await.context("Failed to remove book")?;

    output.success(&format!("Removed '{}'", book.title));

    Ok(())
}
