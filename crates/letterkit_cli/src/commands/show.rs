//! Show command implementation.

use super::{resolve, Format};
use crate::error::CliResult;
use letterkit_core::{LetterStore, SavedLetter, TextDirection};
use std::io::Write;
use std::path::Path;

/// Runs the show command.
pub fn run(store_path: &Path, id: &str, format: Format, out: &mut dyn Write) -> CliResult<()> {
    let store = LetterStore::open(store_path)?;
    let letter = resolve(&store, id)?;

    match format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(letter)?)?,
        Format::Text => print_text(letter, out)?,
    }
    Ok(())
}

fn print_text(letter: &SavedLetter, out: &mut dyn Write) -> std::io::Result<()> {
    let snapshot = &letter.snapshot;
    let direction = match snapshot.language.direction() {
        TextDirection::Rtl => "rtl",
        TextDirection::Ltr => "ltr",
    };

    writeln!(out, "Title:    {}", letter.title)?;
    writeln!(out, "Id:       {}", letter.id)?;
    writeln!(out, "Language: {} ({direction})", snapshot.language.code())?;
    if !snapshot.date.is_empty() {
        writeln!(out, "Date:     {}", snapshot.date)?;
    }

    let recipient: Vec<&str> = [
        &snapshot.recipient_title,
        &snapshot.recipient_name,
        &snapshot.recipient_organization,
    ]
    .into_iter()
    .filter_map(|field| field.as_deref())
    .collect();
    if !recipient.is_empty() {
        writeln!(out, "To:       {}", recipient.join(", "))?;
    }
    if !snapshot.subject.is_empty() {
        writeln!(out, "Subject:  {}", snapshot.subject)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", snapshot.content)?;

    if let Some(closing) = &snapshot.closing {
        writeln!(out)?;
        writeln!(out, "{closing}")?;
    }
    if snapshot.signature.is_some() {
        writeln!(out, "[signature attached]")?;
    }
    Ok(())
}
