//! Saved-letter persistence.
//!
//! Letters are kept in a single JSON file:
//!
//! ```json
//! { "version": 1, "letters": [ { "id": "…", "title": "…", "saved_at_ms": 0, "snapshot": { … } } ] }
//! ```
//!
//! Writes use the write-then-rename pattern so a crash never leaves a
//! half-written file behind.

use crate::error::{CoreError, CoreResult};
use crate::snapshot::LetterSnapshot;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use uuid::Uuid;

/// Current store file version.
pub const STORE_VERSION: u32 = 1;

/// A letter saved under a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLetter {
    /// Unique id.
    pub id: Uuid,
    /// User-facing title.
    pub title: String,
    /// Save time in Unix milliseconds.
    pub saved_at_ms: u64,
    /// The saved letter state.
    pub snapshot: LetterSnapshot,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    letters: Vec<SavedLetter>,
}

/// Collection of saved letters, optionally backed by a file.
#[derive(Debug, Default)]
pub struct LetterStore {
    path: Option<PathBuf>,
    letters: Vec<SavedLetter>,
}

impl LetterStore {
    /// Creates a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`.
    ///
    /// A missing or empty file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// was written with an unsupported version.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let letters = match fs::read(&path) {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(data) => {
                let file: StoreFile = serde_json::from_slice(&data)?;
                if file.version != STORE_VERSION {
                    return Err(CoreError::UnsupportedVersion {
                        found: file.version,
                        expected: STORE_VERSION,
                    });
                }
                file.letters
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), count = letters.len(), "opened letter store");
        Ok(Self {
            path: Some(path),
            letters,
        })
    }

    /// Saves a snapshot under `title` and returns its id.
    ///
    /// Call [`flush`](Self::flush) to persist.
    pub fn save(&mut self, title: impl Into<String>, snapshot: LetterSnapshot) -> Uuid {
        let letter = SavedLetter {
            id: Uuid::new_v4(),
            title: title.into(),
            saved_at_ms: now_ms(),
            snapshot,
        };
        let id = letter.id;
        self.letters.push(letter);
        id
    }

    /// Looks up a saved letter.
    pub fn get(&self, id: &Uuid) -> Option<&SavedLetter> {
        self.letters.iter().find(|l| l.id == *id)
    }

    /// Finds a letter whose id starts with `prefix` (as printed by `list`).
    ///
    /// Returns `None` if nothing or more than one letter matches.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&SavedLetter> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .letters
            .iter()
            .filter(|l| l.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(letter), None) => Some(letter),
            _ => None,
        }
    }

    /// Lists saved letters, most recently saved first.
    pub fn list(&self) -> Vec<&SavedLetter> {
        let mut letters: Vec<_> = self.letters.iter().enumerate().collect();
        letters.sort_by(|(ia, a), (ib, b)| b.saved_at_ms.cmp(&a.saved_at_ms).then(ib.cmp(ia)));
        letters.into_iter().map(|(_, l)| l).collect()
    }

    /// Removes a saved letter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LetterNotFound`] if no letter has that id.
    pub fn remove(&mut self, id: &Uuid) -> CoreResult<SavedLetter> {
        let index = self
            .letters
            .iter()
            .position(|l| l.id == *id)
            .ok_or(CoreError::LetterNotFound { id: *id })?;
        Ok(self.letters.remove(index))
    }

    /// Number of saved letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Returns true if nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the store to its file. In-memory stores ignore this.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn flush(&self) -> CoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = StoreFile {
            version: STORE_VERSION,
            letters: self.letters.clone(),
        };
        let data = serde_json::to_vec_pretty(&file)?;

        let temp_path = path.with_extension("json.tmp");
        let mut temp = File::create(&temp_path)?;
        temp.write_all(&data)?;
        temp.sync_all()?;
        drop(temp);

        fs::rename(&temp_path, path)?;
        info!(path = %path.display(), count = self.letters.len(), "letter store written");
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Language;
    use tempfile::tempdir;

    fn letter(content: &str) -> LetterSnapshot {
        LetterSnapshot::new(content, Language::Arabic).with_subject("طلب إجازة")
    }

    #[test]
    fn save_get_remove() {
        let mut store = LetterStore::in_memory();
        let id = store.save("Leave", letter("body"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).map(|l| l.title.as_str()), Some("Leave"));

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.snapshot, letter("body"));
        assert!(store.is_empty());
        assert!(matches!(
            store.remove(&id),
            Err(CoreError::LetterNotFound { .. })
        ));
    }

    #[test]
    fn list_is_newest_first() {
        let mut store = LetterStore::in_memory();
        store.save("first", letter("1"));
        store.save("second", letter("2"));
        store.save("third", letter("3"));

        let titles: Vec<_> = store.list().iter().map(|l| l.title.clone()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test]
    fn prefix_lookup() {
        let mut store = LetterStore::in_memory();
        let id = store.save("only", letter("x"));
        let prefix = &id.to_string()[..8];

        assert_eq!(store.find_by_prefix(prefix).map(|l| l.id), Some(id));
        assert!(store.find_by_prefix("").is_none());
        assert!(store.find_by_prefix("zzzz").is_none());
    }

    #[test]
    fn flush_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letters").join("saved.json");

        let mut store = LetterStore::open(&path).unwrap();
        assert!(store.is_empty());
        let id = store.save("Reference letter", letter("content"));
        store.flush().unwrap();

        let reopened = LetterStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&id).unwrap().snapshot, letter("content"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        fs::write(&path, r#"{"version":99,"letters":[]}"#).unwrap();

        let err = LetterStore::open(&path).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedVersion {
                found: 99,
                expected: 1
            }
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(LetterStore::open(&path), Err(CoreError::Json(_))));
    }

    #[test]
    fn empty_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        fs::write(&path, "\n").unwrap();

        assert!(LetterStore::open(&path).unwrap().is_empty());
    }
}
