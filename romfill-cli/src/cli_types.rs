//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use romfill_core::AssetKind;

#[derive(Parser)]
#[command(name = "romfill")]
#[command(
    about = "Download the files a MAME audit report lists as missing",
    long_about = None
)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the report lives and where files go. Overrides the settings file.
#[derive(Args, Clone, Default)]
pub(crate) struct JobArgs {
    /// Audit report listing missing files
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Destination root for downloaded files
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Origin URL (folder containing currentroms/, bios/, CHDs/, samples/)
    #[arg(long)]
    pub url: Option<String>,

    /// Username for the origin
    #[arg(long)]
    pub username: Option<String>,

    /// Password for the origin (prefer ROMFILL_PASSWORD or the settings file)
    #[arg(long)]
    pub password: Option<String>,
}

/// Narrow the parsed obligations.
#[derive(Args, Clone, Default)]
pub(crate) struct FilterArgs {
    /// Only these kinds (e.g., rom,chd,sample,bios)
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Option<Vec<AssetKind>>,

    /// Maximum number of items to process
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Download everything the report lists, then prune it from the report
    Fetch {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Show what would be downloaded without downloading
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Leave the report untouched after downloading
        #[arg(long)]
        no_cleanup: bool,
    },

    /// List what the report asks for
    Parse {
        /// Audit report (defaults to the configured report)
        report: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Manage origin and path settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and where each value comes from
    Show,

    /// Interactively set up origin, credentials and paths
    Setup,

    /// Print the settings file path
    Path,
}
