//! List command implementation.

use super::{short_id, Format};
use crate::error::CliResult;
use letterkit_core::LetterStore;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One row of the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    /// Full letter id.
    pub id: String,
    /// Letter title.
    pub title: String,
    /// Language code.
    pub language: String,
    /// Subject line.
    pub subject: String,
    /// Save time in Unix milliseconds.
    pub saved_at_ms: u64,
}

/// Runs the list command.
pub fn run(store_path: &Path, format: Format, out: &mut dyn Write) -> CliResult<()> {
    let store = LetterStore::open(store_path)?;
    tracing::debug!(count = store.len(), "listing letters");

    match format {
        Format::Json => {
            let entries: Vec<ListEntry> = store
                .list()
                .into_iter()
                .map(|l| ListEntry {
                    id: l.id.to_string(),
                    title: l.title.clone(),
                    language: l.snapshot.language.code().to_owned(),
                    subject: l.snapshot.subject.clone(),
                    saved_at_ms: l.saved_at_ms,
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        }
        Format::Text => {
            if store.is_empty() {
                writeln!(out, "No saved letters in {}", store_path.display())?;
                return Ok(());
            }
            writeln!(out, "{:<8}  {:<4}  TITLE", "ID", "LANG")?;
            for letter in store.list() {
                writeln!(
                    out,
                    "{:<8}  {:<4}  {}",
                    short_id(letter),
                    letter.snapshot.language.code(),
                    letter.title
                )?;
            }
        }
    }

    Ok(())
}
