//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Drydock - automated dependency version upgrades across manifest graphs
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Move one dependency to a new version across the manifest graph
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Dependency name
    pub name: String,

    /// Version to move to
    #[arg(long)]
    pub version: String,

    /// Known previous version (omit for peer mode)
    #[arg(long)]
    pub previous: Option<String>,

    /// Treat the dependency as transitive (centralized pin path)
    #[arg(long)]
    pub transitive: bool,

    /// Repository root directory (defaults to the current directory)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Root manifests, relative to the repository root
    #[arg(long = "root")]
    pub roots: Vec<String>,

    /// Native resolver/checker command; omitted = declaration-backed checks
    #[arg(long, env = "DRYDOCK_CHECKER")]
    pub checker: Option<String>,

    /// Native add-dependency command, for the centralized-pin fallback
    #[arg(long, env = "DRYDOCK_ADD_TOOL")]
    pub add_tool: Option<String>,

    /// Per-target consistency check timeout, in seconds
    #[arg(long, default_value_t = 60)]
    pub check_timeout: u64,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}
