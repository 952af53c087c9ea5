//! Delete command implementation.

use super::resolve;
use crate::error::CliResult;
use letterkit_core::LetterStore;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Runs the delete command.
pub fn run(store_path: &Path, id: &str, out: &mut dyn Write) -> CliResult<()> {
    let mut store = LetterStore::open(store_path)?;
    let id = resolve(&store, id)?.id;

    let removed = store.remove(&id)?;
    store.flush()?;

    info!(%id, "deleted letter");
    writeln!(out, "Deleted {} ({})", removed.id, removed.title)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{output, seeded_store};
    use crate::error::CliError;

    #[test]
    fn delete_persists() {
        let (_dir, path) = seeded_store();
        let id = {
            let store = LetterStore::open(&path).unwrap();
            store.list()[0].id
        };

        let mut buf = Vec::new();
        run(&path, &id.to_string(), &mut buf).unwrap();
        assert!(output(buf).starts_with(&format!("Deleted {id}")));

        let store = LetterStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn delete_unknown_leaves_store_alone() {
        let (_dir, path) = seeded_store();
        let err = run(&path, "0000dead", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::NoMatch { .. }));
        assert_eq!(LetterStore::open(&path).unwrap().len(), 2);
    }
}
