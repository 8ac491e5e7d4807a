//! Referral CLI Entry Point
//!
//! Configuration is loaded from environment variables (via .env file).
//! Command-line arguments override environment variables.
//!
//! Usage:
//!   referral import <FILE>     - Load users into the directory
//!   referral earnings <USER>   - Live three-level earnings
//!   referral cached <USER>     - Earnings through the snapshot cache
//!   referral leaderboard       - Ranked referrers and platform stats
//!   referral tree <USER>       - Team tree with per-member contribution

use clap::Parser;
use referral_cli::{handler, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.verbose {
        init_logging();
    }

    if let Err(e) = handler::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "referral_cli=debug,referral_core=debug,referral_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
