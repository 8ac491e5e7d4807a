//! Referral CLI - Command Line Interface
//!
//! Admin command-line interface for the referral earnings engine, backed by
//! the sled store.
//!
//! # Usage
//!
//! ```text
//! referral [OPTIONS] <COMMAND>
//!
//! Commands:
//!   import       Import users from a JSON array file
//!   activate     Approve (or revoke) a user's activation
//!   remove       Delete a user and its snapshot
//!   earnings     Compute live earnings
//!   refresh      Recompute and store a user's snapshot
//!   cached       Read earnings through the snapshot cache
//!   snapshots    List cached snapshots by total earnings
//!   leaderboard  Ranked referrers with hall of fame and platform stats
//!   tree         Show a user's team level by level
//!   stats        Show store statistics
//!
//! Options:
//!       --db-path <PATH>   Sled database directory [default: ./referral_data]
//!   -f, --format <FORMAT>  Output format (json, table) [default: table]
//!   -v, --verbose          Enable verbose output
//!   -h, --help             Print help
//!   -V, --version          Print version
//! ```
//!
//! # Examples
//!
//! ## Import and approve
//! ```text
//! referral import users.json
//! referral activate user-17
//! ```
//!
//! ## Leaderboard
//! ```text
//! referral leaderboard --range 30d --sort conversion-rate --page 2 --page-size 25
//! ```
//!
//! Engine settings come from `REFERRAL_*` environment variables (see
//! `EngineConfig::from_env`), optionally loaded from a `.env` file.

pub mod commands;
pub mod error;
pub mod handler;
pub mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// Referral CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
