//! Command-line arguments for the `sqlcase` binary, declared with `clap`'s
//! derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "sqlcase",
    version,
    about = "Inspect and validate YAML SQL case fixtures."
)]
pub struct SqlCaseArgs {
    /// Directory fixture paths resolve against (defaults to $SQLCASE_ROOT or ./cases).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the suite inventory: every group, its fixture and whether it runs.
    List {
        /// Emit the inventory as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load and validate every fixture under a directory.
    Check {
        /// Directory to scan; defaults to the case root.
        path: Option<PathBuf>,
    },
}
