//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nlib")]
#[command(about = "Sync the nlib title catalog from its remote sources", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database path (overrides settings)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Media directory (overrides settings)
    #[arg(long, global = true)]
    pub media_dir: Option<PathBuf>,

    /// Settings file (defaults to ~/.config/nlib/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a sync job once
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },

    /// Run the scheduler until interrupted
    Daemon,

    /// Show catalog counts and the last sync
    Status,

    /// Show recent sync log entries, newest first
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub(crate) enum SyncTarget {
    /// Seed base-title identifiers
    Ids,
    /// Merge every catalog source
    Catalog,
    /// Identifier sync, then catalog sync
    All,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the effective settings
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with all defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
