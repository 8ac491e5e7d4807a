//! Storage Interfaces
//!
//! The engine reads users through [`UserDirectory`] and caches results in a
//! [`SnapshotStore`]. It never writes to the directory.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ReferralResult;
use crate::types::{ActivityFilter, EarningsSnapshot, UserId, UserRecord};

/// Read access to the user directory
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by identifier
    async fn find_by_id(&self, user_id: &UserId) -> ReferralResult<Option<UserRecord>>;

    /// All users whose recruiter is in `parents`
    async fn find_children_of(
        &self,
        parents: &HashSet<UserId>,
        filter: ActivityFilter,
    ) -> ReferralResult<Vec<UserRecord>>;

    /// Every user that recruited at least one other user
    async fn find_referrers(&self) -> ReferralResult<Vec<UserRecord>>;

    /// Direct recruits of one user, active or not
    async fn find_direct_referrals(&self, user_id: &UserId) -> ReferralResult<Vec<UserRecord>> {
        let parents = HashSet::from([user_id.clone()]);
        self.find_children_of(&parents, ActivityFilter::All).await
    }

    /// Identifiers of active users whose recruiter is in `parents`
    async fn find_active_children_of(
        &self,
        parents: &HashSet<UserId>,
    ) -> ReferralResult<HashSet<UserId>> {
        if parents.is_empty() {
            return Ok(HashSet::new());
        }
        let children = self
            .find_children_of(parents, ActivityFilter::ActiveOnly)
            .await?;
        Ok(children.into_iter().map(|u| u.id).collect())
    }
}

/// Persistence for earnings snapshots (one row per user)
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Get a user's snapshot
    async fn get_snapshot(&self, user_id: &UserId) -> ReferralResult<Option<EarningsSnapshot>>;

    /// Insert or fully overwrite a user's snapshot
    async fn upsert_snapshot(&self, snapshot: &EarningsSnapshot) -> ReferralResult<()>;

    /// List snapshots, optionally only those included in listings
    async fn list_snapshots(&self, active_only: bool) -> ReferralResult<Vec<EarningsSnapshot>>;

    /// Include or exclude a snapshot from listings; false if absent
    async fn set_snapshot_active(&self, user_id: &UserId, active: bool) -> ReferralResult<bool>;

    /// Delete a snapshot; false if absent
    async fn delete_snapshot(&self, user_id: &UserId) -> ReferralResult<bool>;
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_users: u64,
    pub active_users: u64,
    pub referrers: u64,
    pub snapshots: u64,
    pub active_snapshots: u64,
}

pub use memory::MemoryStore;
