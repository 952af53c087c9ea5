//! CLI command implementations.

pub mod delete;
pub mod export;
pub mod list;
pub mod show;

use crate::error::{CliError, CliResult};
use clap::ValueEnum;
use letterkit_core::{LetterStore, SavedLetter};

/// Output format for listing and showing letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Finds the letter matching a full id or unique id prefix.
pub(crate) fn resolve<'a>(store: &'a LetterStore, id: &str) -> CliResult<&'a SavedLetter> {
    store.find_by_prefix(id).ok_or_else(|| CliError::NoMatch {
        prefix: id.to_owned(),
    })
}

/// First eight characters of an id, as shown by `list`.
pub(crate) fn short_id(letter: &SavedLetter) -> String {
    letter.id.to_string().chars().take(8).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use letterkit_core::{Language, LetterSnapshot, LetterStore};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A store file with two letters saved, English first.
    pub fn seeded_store() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letters.json");

        let mut store = LetterStore::open(&path).unwrap();
        store.save(
            "Leave request",
            LetterSnapshot::new("I would like to request two weeks of leave.", Language::English)
                .with_date("19 October 2026")
                .with_recipient_name("Ms. Haddad")
                .with_subject("Annual leave")
                .with_closing("Yours sincerely"),
        );
        store.save(
            "طلب إجازة",
            LetterSnapshot::new("أرجو الموافقة على منحي إجازة سنوية.", Language::Arabic)
                .with_subject("إجازة سنوية")
                .with_signature("data:image/png;base64,AAAA"),
        );
        store.flush().unwrap();

        (dir, path)
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
