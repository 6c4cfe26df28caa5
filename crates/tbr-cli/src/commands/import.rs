//! Import command handler
//!
//! One-shot version of the import pipeline: fetch candidates, drop the
//! ones already on the list, insert the rest concurrently.

use anyhow::{Context, Result};
use futures_util::future::try_join_all;

use tbr_core::{dedup_candidates, fetch_candidates, BookStatus, BookStore};

use crate::output::{Output, OutputFormat};

/// Fetch candidates from the endpoint and insert the new ones
pub async fn run(store: &BookStore, url: &str, output: &Output) -> Result<()> {
    let candidates = fetch_candidates(url)
        .await
        .context("Failed to fetch import candidates")?;
    let fetched = candidates.len();

    let existing = store.all().await.context("Failed to list books")?;
    let fresh = dedup_candidates(candidates, &existing);
    let skipped = fetched - fresh.len();

    let inserts = fresh
        .into_iter()
        .map(|candidate| store.insert(candidate.title, candidate.author, BookStatus::Planning));
    let inserted = try_join_all(inserts)
        .await
        .context("Failed to insert imported books")?;

    match output.format {
        OutputFormat::Human => {
            output.success(&format!(
                "Imported {} book(s) ({} fetched, {} already on the list)",
                inserted.len(),
                fetched,
                skipped
            ));
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "fetched": fetched,
                    "skipped": skipped,
                    "inserted": inserted.len()
                })
            );
        }
        OutputFormat::Quiet => {
            for book in &inserted {
                println!("{}", book.id);
            }
        }
    }

    Ok(())
}
