//! CLI Commands Module
//!
//! Command definitions for the referral admin CLI.

pub mod listing;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use listing::{LeaderboardArgs, PageArgs};

/// Referral earnings admin CLI
#[derive(Parser, Debug)]
#[command(name = "referral")]
#[command(author = "Rainbow City Foundation")]
#[command(version)]
#[command(about = "Referral earnings engine command line interface")]
#[command(long_about = "Administer the multilevel referral engine.\n\n\
    Import users, approve activations, compute earnings, maintain the snapshot \
    cache, and inspect leaderboards and team trees.")]
pub struct Cli {
    /// Sled database directory (env: REFERRAL_DB_PATH)
    #[arg(long, env = "REFERRAL_DB_PATH", default_value = "./referral_data")]
    pub db_path: PathBuf,

    /// Output format (json, table)
    #[arg(short, long, env = "REFERRAL_OUTPUT_FORMAT", default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table format (human-readable)
    #[default]
    Table,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import users from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Approve (or revoke) a user's activation
    Activate {
        user_id: String,
        /// Mark the user inactive instead
        #[arg(long)]
        inactive: bool,
    },

    /// Delete a user and its snapshot
    Remove { user_id: String },

    /// Compute live earnings
    Earnings { user_id: String },

    /// Recompute and store a user's snapshot
    Refresh { user_id: String },

    /// Read earnings through the snapshot cache
    Cached { user_id: String },

    /// List cached snapshots by total earnings
    Snapshots(PageArgs),

    /// Ranked referrers with hall of fame and platform stats
    Leaderboard(LeaderboardArgs),

    /// Show a user's team level by level
    Tree { user_id: String },

    /// Show store statistics
    Stats,
}
