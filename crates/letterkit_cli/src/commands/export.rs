//! Export command implementation.

use super::resolve;
use crate::error::CliResult;
use letterkit_core::LetterStore;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Runs the export command.
///
/// Writes the letter's snapshot (not the store wrapper) as pretty JSON to
/// `dest`, or to `out` when no destination is given.
pub fn run(
    store_path: &Path,
    id: &str,
    dest: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let store = LetterStore::open(store_path)?;
    let letter = resolve(&store, id)?;
    let json = serde_json::to_string_pretty(&letter.snapshot)?;

    match dest {
        Some(dest) => {
            fs::write(dest, format!("{json}\n"))?;
            info!(id = %letter.id, dest = %dest.display(), "exported letter");
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}
