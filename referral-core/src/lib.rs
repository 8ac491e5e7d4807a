//! Referral Core - Multilevel Referral Earnings
//!
//! Computes what a user earns from the people they recruited, up to three
//! generations deep, and keeps a snapshot cache and leaderboard on top of it.
//!
//! # Earnings Rule
//!
//! | Level | Who counts | RWF per user |
//! |-------|------------|--------------|
//! | 1 | Active direct recruits | 4000 |
//! | 2 | Active recruits of active level-1 users | 1500 |
//! | 3 | Active recruits of active level-2 users | 900 |
//!
//! An inactive user earns its recruiter nothing and blocks its own sub-tree.
//! The rate table is configuration ([`CommissionRates`]); its length sets the
//! traversal depth.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ReferralEngine                         │
//! │  compute_earnings · refresh_snapshot · cached_earnings      │
//! │  list_referrers · list_snapshots · get_user_referral_tree   │
//! ├──────────────┬──────────────┬──────────────┬────────────────┤
//! │ TierResolver │ Commission   │ Snapshot     │ ListingBuilder │
//! │              │ Calculator   │ Writer       │ TreeBuilder    │
//! ├──────────────┴──────────────┼──────────────┴────────────────┤
//! │        UserDirectory        │         SnapshotStore          │
//! │   (read-only collaborator)  │       (write-through cache)    │
//! └─────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use referral_core::{EngineConfig, MemoryStore, ReferralEngine, UserId};
//! use std::sync::Arc;
//!
//! async fn example() -> referral_core::ReferralResult<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let engine = ReferralEngine::builder()
//!         .config(EngineConfig::default())
//!         .directory(store.clone())
//!         .snapshots(store)
//!         .build()?;
//!
//!     let earnings = engine.compute_earnings(&UserId::new("user-1")).await?;
//!     println!("{} RWF", earnings.total_earnings);
//!     Ok(())
//! }
//! ```

pub mod commission;
pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod snapshot;
pub mod storage;
pub mod team;
pub mod tiers;
pub mod types;

// Re-export error types
pub use error::{ReferralError, ReferralResult};

// Re-export all types
pub use types::*;

// Re-export configuration
pub use config::EngineConfig;

// Re-export commission
pub use commission::{CommissionCalculator, CommissionRates, DEFAULT_MAX_DEPTH, DEFAULT_TIER_RATES};

// Re-export components
pub use engine::{ReferralEngine, ReferralEngineBuilder};
pub use leaderboard::{ActivityScoreWeights, ListingBuilder, ReferrerEntry};
pub use snapshot::{SnapshotPage, SnapshotWriter};
pub use storage::{MemoryStore, SnapshotStore, StorageStats, UserDirectory};
pub use team::TreeBuilder;
pub use tiers::{TierResolver, TierSets};

/// Referral core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
