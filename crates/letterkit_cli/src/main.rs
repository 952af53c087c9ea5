//! LetterKit CLI
//!
//! Command-line tools for the saved-letter store.
//!
//! # Commands
//!
//! - `list` - List saved letters, newest first
//! - `show` - Print one letter
//! - `export` - Write a letter's snapshot as JSON
//! - `delete` - Remove a letter from the store

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::Format;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LetterKit command-line letter tools.
#[derive(Parser)]
#[command(name = "letterkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the saved-letter file
    #[arg(global = true, short, long, default_value = "letters.json")]
    store: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved letters, newest first
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print one saved letter
    Show {
        /// Letter id or a unique prefix of it
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Write a letter's snapshot as JSON
    Export {
        /// Letter id or a unique prefix of it
        id: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove a saved letter
    Delete {
        /// Letter id or a unique prefix of it
        id: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::List { format } => {
            commands::list::run(&cli.store, format, &mut stdout)?;
        }
        Commands::Show { id, format } => {
            commands::show::run(&cli.store, &id, format, &mut stdout)?;
        }
        Commands::Export { id, out } => {
            commands::export::run(&cli.store, &id, out.as_deref(), &mut stdout)?;
        }
        Commands::Delete { id } => {
            commands::delete::run(&cli.store, &id, &mut stdout)?;
        }
        Commands::Version => {
            writeln!(stdout, "LetterKit CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(stdout, "Store format v{}", letterkit_core::STORE_VERSION)?;
        }
    }

    Ok(())
}
