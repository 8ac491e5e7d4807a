//! Referral Store - Persistent Directory and Snapshot Cache
//!
//! Implements [`referral_core::UserDirectory`] and
//! [`referral_core::SnapshotStore`] on the sled embedded database, so the
//! engine and the admin CLI can share one on-disk store.
//!
//! # Usage
//!
//! ```rust,no_run
//! use referral_store::{SledStore, StorageConfig};
//! use referral_core::{ReferralEngine, UserRecord};
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SledStore::new(&StorageConfig::at("./referral_data"))?);
//!     store.insert_user(&UserRecord::new("u1", "Alice", "alice@example.rw").with_active(true))?;
//!
//!     let engine = ReferralEngine::builder()
//!         .directory(store.clone())
//!         .snapshots(store)
//!         .build()?;
//!     let tree = engine.get_user_referral_tree(&"u1".into()).await?;
//!     println!("{} members", tree.stats.total_members);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod sled;

pub use config::StorageConfig;
pub use error::{StoreError, StoreResult};
pub use self::sled::SledStore;
