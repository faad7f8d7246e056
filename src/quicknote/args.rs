use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quicknote",
    bin_name = "quicknote",
    version,
    args_conflicts_with_subcommands = true
)]
#[command(about = "Tabbed note editor with crash-safe auto-save", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files to open in the session
    pub files: Vec<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an editing session (the default)
    #[command(alias = "s", display_order = 1)]
    Session {
        /// Files to open
        files: Vec<PathBuf>,
    },

    /// List auto-saved snapshots waiting for recovery
    #[command(alias = "ls", display_order = 10)]
    Snapshots,

    /// Print the snapshot path used for a file
    #[command(display_order = 11)]
    Path {
        /// The file
        file: PathBuf,
    },

    /// Delete every snapshot
    #[command(display_order = 12)]
    Purge {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Get or set configuration (autosave-interval, snapshot-dir)
    #[command(display_order = 20)]
    Config {
        /// Configuration key
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },
}
