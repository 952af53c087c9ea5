//! CLI error type.

use letterkit_core::CoreError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Store failure.
    #[error(transparent)]
    Store(#[from] CoreError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No single letter matches the given id prefix.
    #[error("no unique letter matches '{prefix}'")]
    NoMatch {
        /// The id or prefix given on the command line.
        prefix: String,
    },
}
