//! In-Memory Store
//!
//! Directory and snapshot store backed by `RwLock`-guarded maps, for tests
//! and development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{SnapshotStore, StorageStats, UserDirectory};
use crate::error::{ReferralError, ReferralResult};
use crate::types::{order_for_import, ActivityFilter, EarningsSnapshot, UserId, UserRecord};

/// In-memory store
///
/// Lock order: `users` before `children` before `snapshots`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
    // recruiter -> recruits
    children: Arc<RwLock<HashMap<UserId, Vec<UserId>>>>,
    snapshots: Arc<RwLock<HashMap<UserId, EarningsSnapshot>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. The recruiter must already exist.
    pub async fn insert_user(&self, user: UserRecord) -> ReferralResult<()> {
        user.validate()?;

        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(ReferralError::DuplicateUser {
                user_id: user.id.to_string(),
            });
        }
        if let Some(referrer) = &user.referred_by {
            if !users.contains_key(referrer) {
                return Err(ReferralError::UnknownReferrer {
                    user_id: user.id.to_string(),
                    referrer_id: referrer.to_string(),
                });
            }
            let mut children = self.children.write().await;
            children
                .entry(referrer.clone())
                .or_default()
                .push(user.id.clone());
        }

        users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Register a batch in recruiter-first order
    pub async fn import_users(&self, records: Vec<UserRecord>) -> ReferralResult<usize> {
        let existing: HashSet<UserId> = self.users.read().await.keys().cloned().collect();
        let ordered = order_for_import(records, &existing)?;
        let count = ordered.len();
        for user in ordered {
            self.insert_user(user).await?;
        }
        Ok(count)
    }

    /// Flip a user's active flag
    pub async fn set_user_active(&self, user_id: &UserId, active: bool) -> ReferralResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| ReferralError::not_found("User", user_id.as_str()))?;
        user.is_active = active;
        Ok(())
    }

    /// Delete a user and its snapshot.
    ///
    /// A user who still recruits others cannot be removed; their recruits'
    /// `referred_by` is permanent.
    pub async fn remove_user(&self, user_id: &UserId) -> ReferralResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let mut children = self.children.write().await;

        let recruits = children.get(user_id).map_or(0, Vec::len);
        if recruits > 0 {
            return Err(ReferralError::HasRecruits {
                user_id: user_id.to_string(),
                recruits,
            });
        }

        let removed = users.remove(user_id);
        if let Some(user) = &removed {
            children.remove(user_id);
            if let Some(referrer) = &user.referred_by {
                if let Some(ids) = children.get_mut(referrer) {
                    ids.retain(|id| id != user_id);
                    if ids.is_empty() {
                        children.remove(referrer);
                    }
                }
            }
            self.snapshots.write().await.remove(user_id);
        }

        Ok(removed)
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Store statistics
    pub async fn stats(&self) -> StorageStats {
        let users = self.users.read().await;
        let children = self.children.read().await;
        let snapshots = self.snapshots.read().await;

        StorageStats {
            total_users: users.len() as u64,
            active_users: users.values().filter(|u| u.is_active).count() as u64,
            referrers: children.values().filter(|c| !c.is_empty()).count() as u64,
            snapshots: snapshots.len() as u64,
            active_snapshots: snapshots.values().filter(|s| s.is_active).count() as u64,
        }
    }

    /// Clear all data
    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.children.write().await.clear();
        self.snapshots.write().await.clear();
    }
}

fn sort_users(users: &mut [UserRecord]) {
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, user_id: &UserId) -> ReferralResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_children_of(
        &self,
        parents: &HashSet<UserId>,
        filter: ActivityFilter,
    ) -> ReferralResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        let children = self.children.read().await;

        let mut found: Vec<UserRecord> = parents
            .iter()
            .filter_map(|parent| children.get(parent))
            .flatten()
            .filter_map(|id| users.get(id))
            .filter(|u| filter.admits(u))
            .cloned()
            .collect();

        sort_users(&mut found);
        Ok(found)
    }

    async fn find_referrers(&self) -> ReferralResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        let children = self.children.read().await;

        let mut referrers: Vec<UserRecord> = children
            .iter()
            .filter(|(_, recruits)| !recruits.is_empty())
            .filter_map(|(id, _)| users.get(id))
            .cloned()
            .collect();

        sort_users(&mut referrers);
        Ok(referrers)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get_snapshot(&self, user_id: &UserId) -> ReferralResult<Option<EarningsSnapshot>> {
        Ok(self.snapshots.read().await.get(user_id).cloned())
    }

    async fn upsert_snapshot(&self, snapshot: &EarningsSnapshot) -> ReferralResult<()> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.user_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn list_snapshots(&self, active_only: bool) -> ReferralResult<Vec<EarningsSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots
            .values()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect())
    }

    async fn set_snapshot_active(&self, user_id: &UserId, active: bool) -> ReferralResult<bool> {
        let mut snapshots = self.snapshots.write().await;
        match snapshots.get_mut(user_id) {
            Some(snapshot) => {
                snapshot.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_snapshot(&self, user_id: &UserId) -> ReferralResult<bool> {
        Ok(self.snapshots.write().await.remove(user_id).is_some())
    }
}
