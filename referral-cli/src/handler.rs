//! Command Handlers
//!
//! Handler functions for CLI commands.

use crate::commands::{Cli, Commands, LeaderboardArgs, OutputFormat, PageArgs};
use crate::error::{CliError, CliResult};
use crate::output;
use referral_core::{EngineConfig, ReferralEngine, UserId, UserRecord};
use referral_store::{SledStore, StorageConfig, StoreError};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

type Engine = ReferralEngine<SledStore, SledStore>;

/// Summary printed after an import
#[derive(Debug, Serialize)]
struct ImportSummary {
    file: String,
    records: usize,
    imported: usize,
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let store = Arc::new(SledStore::new(&StorageConfig::at(cli.db_path.clone()))?);
    let format = cli.format;

    match cli.command {
        Commands::Import { file } => handle_import(&store, &file, format),
        Commands::Activate { user_id, inactive } => {
            handle_activate(&store, &user_id, !inactive, format)
        }
        Commands::Remove { user_id } => handle_remove(&store, &user_id),
        Commands::Stats => handle_stats(&store, format),
        command => {
            let engine = build_engine(store)?;
            match command {
                Commands::Earnings { user_id } => handle_earnings(&engine, &user_id, format).await,
                Commands::Refresh { user_id } => handle_refresh(&engine, &user_id, format).await,
                Commands::Cached { user_id } => handle_cached(&engine, &user_id, format).await,
                Commands::Snapshots(args) => handle_snapshots(&engine, args, format).await,
                Commands::Leaderboard(args) => handle_leaderboard(&engine, &args, format).await,
                Commands::Tree { user_id } => handle_tree(&engine, &user_id, format).await,
                Commands::Import { .. }
                | Commands::Activate { .. }
                | Commands::Remove { .. }
                | Commands::Stats => unreachable!(),
            }
        }
    }
}

fn build_engine(store: Arc<SledStore>) -> CliResult<Engine> {
    let config = EngineConfig::from_env().map_err(|e| CliError::config(e.to_string()))?;
    let engine = ReferralEngine::builder()
        .config(config)
        .directory(store.clone())
        .snapshots(store)
        .build()?;
    Ok(engine)
}

// ============ Directory administration ============

fn handle_import(store: &SledStore, file: &Path, format: OutputFormat) -> CliResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let records: Vec<UserRecord> = serde_json::from_str(&raw)?;
    let total = records.len();

    let imported = store.import_users(records)?;
    store.flush()?;
    info!(file = %file.display(), imported, "Users imported");

    let summary = ImportSummary {
        file: file.display().to_string(),
        records: total,
        imported,
    };
    match format {
        OutputFormat::Json => output::print_output(&summary, format),
        OutputFormat::Table => output::print_success(&format!(
            "Imported {} of {} users from {}",
            summary.imported, summary.records, summary.file
        )),
    }
    Ok(())
}

fn handle_activate(
    store: &SledStore,
    user_id: &str,
    active: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let user = store
        .set_user_active(&parse_user_id(user_id)?, active)
        .map_err(|e| not_found_or(e, user_id))?;
    store.flush()?;

    output::print_user(&user, format);
    Ok(())
}

fn handle_remove(store: &SledStore, user_id: &str) -> CliResult<()> {
    let removed = store
        .remove_user(&parse_user_id(user_id)?)
        .map_err(|e| match e {
            StoreError::Rejected(rule) => CliError::EngineError(rule),
            other => CliError::StoreError(other),
        })?;
    match removed {
        Some(user) => {
            store.flush()?;
            output::print_success(&format!("Removed {} ({})", user.id, user.name));
            Ok(())
        }
        None => Err(CliError::not_found(user_id)),
    }
}

fn handle_stats(store: &SledStore, format: OutputFormat) -> CliResult<()> {
    let stats = store.stats()?;
    output::print_stats(&stats, format);
    Ok(())
}

// ============ Engine operations ============

async fn handle_earnings(engine: &Engine, user_id: &str, format: OutputFormat) -> CliResult<()> {
    let earnings = engine.compute_earnings(&parse_user_id(user_id)?).await?;
    output::print_earnings(&earnings, format);
    Ok(())
}

async fn handle_refresh(engine: &Engine, user_id: &str, format: OutputFormat) -> CliResult<()> {
    let refresh = engine.refresh_snapshot(&parse_user_id(user_id)?).await?;
    engine.snapshot_store().flush()?;
    output::print_refresh(&refresh, format);
    Ok(())
}

async fn handle_cached(engine: &Engine, user_id: &str, format: OutputFormat) -> CliResult<()> {
    let cached = engine.cached_earnings(&parse_user_id(user_id)?).await?;
    engine.snapshot_store().flush()?;
    output::print_cached(&cached, format);
    Ok(())
}

async fn handle_snapshots(engine: &Engine, args: PageArgs, format: OutputFormat) -> CliResult<()> {
    let page = engine.list_snapshots(args.to_request()).await?;
    output::print_snapshot_page(&page, format);
    Ok(())
}

async fn handle_leaderboard(
    engine: &Engine,
    args: &LeaderboardArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let query = args
        .to_query()
        .map_err(|e| CliError::invalid_arg(e.to_string()))?;
    let listing = engine.list_referrers(query).await?;
    output::print_listing(&listing, format);
    Ok(())
}

async fn handle_tree(engine: &Engine, user_id: &str, format: OutputFormat) -> CliResult<()> {
    let tree = engine.get_user_referral_tree(&parse_user_id(user_id)?).await?;
    output::print_tree(&tree, format);
    Ok(())
}

// ============ Helpers ============

fn parse_user_id(raw: &str) -> CliResult<UserId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::invalid_arg("user id must not be empty"));
    }
    Ok(UserId::new(trimmed))
}

fn not_found_or(err: StoreError, user_id: &str) -> CliError {
    match err {
        StoreError::NotFound { .. } => CliError::not_found(user_id),
        other => CliError::StoreError(other),
    }
}
