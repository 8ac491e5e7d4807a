//! Sled Persistent Store
//!
//! User directory and snapshot store on the sled embedded database.
//!
//! Trees:
//! - `users`: user id -> `UserRecord` (JSON)
//! - `children`: `referrer \0 recruit` -> empty, scanned by prefix;
//!   `referrer` -> recruit count (u64 BE), read and written inside every
//!   insert and remove transaction
//! - `snapshots`: user id -> `EarningsSnapshot` (JSON)

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info};

use referral_core::{
    order_for_import, ActivityFilter, EarningsSnapshot, ReferralError, ReferralResult,
    SnapshotStore, StorageStats, UserDirectory, UserId, UserRecord,
};

use crate::config::StorageConfig;
use crate::error::{StoreError, StoreResult};

const USERS_TREE: &str = "users";
const CHILDREN_TREE: &str = "children";
const SNAPSHOTS_TREE: &str = "snapshots";

const KEY_SEPARATOR: u8 = 0;

/// Sled store
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
    users: sled::Tree,
    children: sled::Tree,
    snapshots: sled::Tree,
}

impl SledStore {
    /// Create store from configuration
    pub fn new(config: &StorageConfig) -> StoreResult<Self> {
        let db = config
            .to_sled()
            .open()
            .map_err(|e| StoreError::database("Failed to open sled db", e))?;
        Self::from_db(db)
    }

    /// Open or create a database at a path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path).map_err(|e| StoreError::database("Failed to open sled db", e))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let users = db
            .open_tree(USERS_TREE)
            .map_err(|e| StoreError::database("Failed to open users tree", e))?;
        let children = db
            .open_tree(CHILDREN_TREE)
            .map_err(|e| StoreError::database("Failed to open children tree", e))?;
        let snapshots = db
            .open_tree(SNAPSHOTS_TREE)
            .map_err(|e| StoreError::database("Failed to open snapshots tree", e))?;

        Ok(Self {
            db,
            users,
            children,
            snapshots,
        })
    }

    // ==================== Directory writes ====================

    /// Register a user. The recruiter must already exist.
    pub fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        user.validate()?;
        let key = Self::user_key(&user.id)?;
        let value = Self::serialize(user)?;
        let edge = match &user.referred_by {
            Some(referrer) => Some((Self::user_key(referrer)?, Self::edge_key(referrer, &user.id)?)),
            None => None,
        };

        let result = (&self.users, &self.children).transaction(|(users, children)| {
            if users.get(key.as_slice())?.is_some() {
                return Err(ConflictableTransactionError::Abort(StoreError::Rejected(
                    ReferralError::DuplicateUser {
                        user_id: user.id.to_string(),
                    },
                )));
            }
            if let Some((referrer_key, edge_key)) = &edge {
                if users.get(referrer_key.as_slice())?.is_none() {
                    return Err(ConflictableTransactionError::Abort(StoreError::Rejected(
                        ReferralError::UnknownReferrer {
                            user_id: user.id.to_string(),
                            referrer_id: user
                                .referred_by
                                .as_ref()
                                .map(UserId::to_string)
                                .unwrap_or_default(),
                        },
                    )));
                }
                let recruits = Self::recruit_count(children.get(referrer_key.as_slice())?.as_deref())
                    .map_err(ConflictableTransactionError::Abort)?;
                children.insert(referrer_key.as_slice(), (recruits + 1).to_be_bytes().to_vec())?;
                children.insert(edge_key.as_slice(), &[] as &[u8])?;
            }
            users.insert(key.as_slice(), value.as_slice())?;
            Ok(())
        });

        Self::finish(result, "Failed to insert user")?;
        debug!(user_id = %user.id, "User inserted");
        Ok(())
    }

    /// Register a batch in recruiter-first order
    pub fn import_users(&self, records: Vec<UserRecord>) -> StoreResult<usize> {
        let mut existing = HashSet::new();
        for item in self.users.iter().keys() {
            let key = item.map_err(|e| StoreError::database("Failed to iterate users", e))?;
            existing.insert(Self::id_from_bytes(&key)?);
        }

        let ordered = order_for_import(records, &existing)?;
        let count = ordered.len();
        for user in &ordered {
            self.insert_user(user)?;
        }

        info!(count, "Users imported");
        Ok(count)
    }

    /// Flip a user's active flag
    pub fn set_user_active(&self, user_id: &UserId, active: bool) -> StoreResult<UserRecord> {
        let key = Self::user_key(user_id)?;

        let result = self.users.transaction(|users| {
            let mut user: UserRecord = match users.get(key.as_slice())? {
                Some(bytes) => Self::deserialize(&bytes).map_err(ConflictableTransactionError::Abort)?,
                None => {
                    return Err(ConflictableTransactionError::Abort(StoreError::not_found(
                        "User",
                        user_id.as_str(),
                    )))
                }
            };
            user.is_active = active;
            let value = Self::serialize(&user).map_err(ConflictableTransactionError::Abort)?;
            users.insert(key.as_slice(), value)?;
            Ok(user)
        });

        let user = Self::finish(result, "Failed to save user")?;
        debug!(user_id = %user_id, active, "User activity updated");
        Ok(user)
    }

    /// Delete a user, its recruiter edge and its snapshot.
    ///
    /// Refused while the user still has recruits: their `referred_by` is
    /// permanent and must never resolve to a later user with the same id.
    pub fn remove_user(&self, user_id: &UserId) -> StoreResult<Option<UserRecord>> {
        let key = Self::user_key(user_id)?;

        let result = (&self.users, &self.children, &self.snapshots).transaction(
            |(users, children, snapshots)| {
                let existing: UserRecord = match users.get(key.as_slice())? {
                    Some(bytes) => {
                        Self::deserialize(&bytes).map_err(ConflictableTransactionError::Abort)?
                    }
                    None => return Ok(None),
                };

                let recruits = Self::recruit_count(children.get(key.as_slice())?.as_deref())
                    .map_err(ConflictableTransactionError::Abort)?;
                if recruits > 0 {
                    return Err(ConflictableTransactionError::Abort(StoreError::Rejected(
                        ReferralError::HasRecruits {
                            user_id: user_id.to_string(),
                            recruits: recruits as usize,
                        },
                    )));
                }

                users.remove(key.as_slice())?;
                if let Some(referrer) = &existing.referred_by {
                    let referrer_key =
                        Self::user_key(referrer).map_err(ConflictableTransactionError::Abort)?;
                    let edge_key = Self::edge_key(referrer, user_id)
                        .map_err(ConflictableTransactionError::Abort)?;
                    children.remove(edge_key.as_slice())?;

                    let left = Self::recruit_count(children.get(referrer_key.as_slice())?.as_deref())
                        .map_err(ConflictableTransactionError::Abort)?
                        .saturating_sub(1);
                    if left == 0 {
                        children.remove(referrer_key.as_slice())?;
                    } else {
                        children.insert(referrer_key.as_slice(), left.to_be_bytes().to_vec())?;
                    }
                }
                snapshots.remove(key.as_slice())?;
                Ok(Some(existing))
            },
        );

        let removed = Self::finish(result, "Failed to remove user")?;
        if removed.is_some() {
            info!(user_id = %user_id, "User removed with snapshot");
        }
        Ok(removed)
    }

    // ==================== Maintenance ====================

    /// Store statistics
    pub fn stats(&self) -> StoreResult<StorageStats> {
        let mut stats = StorageStats::default();

        for item in self.users.iter() {
            let (_, value) = item.map_err(|e| StoreError::database("Failed to iterate users", e))?;
            let user: UserRecord = Self::deserialize(&value)?;
            stats.total_users += 1;
            if user.is_active {
                stats.active_users += 1;
            }
        }

        stats.referrers = self.referrer_ids()?.len() as u64;

        for item in self.snapshots.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::database("Failed to iterate snapshots", e))?;
            let snapshot: EarningsSnapshot = Self::deserialize(&value)?;
            stats.snapshots += 1;
            if snapshot.is_active {
                stats.active_snapshots += 1;
            }
        }

        Ok(stats)
    }

    /// Clear all data
    pub fn clear(&self) -> StoreResult<()> {
        self.users
            .clear()
            .map_err(|e| StoreError::database("Failed to clear users", e))?;
        self.children
            .clear()
            .map_err(|e| StoreError::database("Failed to clear children", e))?;
        self.snapshots
            .clear()
            .map_err(|e| StoreError::database("Failed to clear snapshots", e))?;
        Ok(())
    }

    /// Flush to disk
    pub fn flush(&self) -> StoreResult<()> {
        self.db
            .flush()
            .map_err(|e| StoreError::database("Failed to flush db", e))?;
        Ok(())
    }

    // ==================== Reads ====================

    fn get_user(&self, user_id: &UserId) -> StoreResult<Option<UserRecord>> {
        let key = Self::user_key(user_id)?;
        match self
            .users
            .get(key)
            .map_err(|e| StoreError::database("Failed to get user", e))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn children_of(&self, parents: &HashSet<UserId>, filter: ActivityFilter) -> StoreResult<Vec<UserRecord>> {
        let mut found = Vec::new();

        for parent in parents {
            let mut prefix = Self::user_key(parent)?;
            prefix.push(KEY_SEPARATOR);

            for item in self.children.scan_prefix(&prefix).keys() {
                let key = item.map_err(|e| StoreError::database("Failed to scan children", e))?;
                let child = Self::id_from_bytes(&key[prefix.len()..])?;
                if let Some(user) = self.get_user(&child)? {
                    if filter.admits(&user) {
                        found.push(user);
                    }
                }
            }
        }

        sort_users(&mut found);
        Ok(found)
    }

    fn referrer_ids(&self) -> StoreResult<BTreeSet<UserId>> {
        let mut ids = BTreeSet::new();
        for item in self.children.iter() {
            let (key, value) =
                item.map_err(|e| StoreError::database("Failed to iterate children", e))?;
            // edges carry the separator; counters are keyed by the bare id
            if key.contains(&KEY_SEPARATOR) {
                continue;
            }
            if Self::recruit_count(Some(value.as_ref()))? > 0 {
                ids.insert(Self::id_from_bytes(&key)?);
            }
        }
        Ok(ids)
    }

    fn referrers(&self) -> StoreResult<Vec<UserRecord>> {
        let mut referrers = Vec::new();
        for id in self.referrer_ids()? {
            if let Some(user) = self.get_user(&id)? {
                referrers.push(user);
            }
        }
        sort_users(&mut referrers);
        Ok(referrers)
    }

    fn get_snapshot_row(&self, user_id: &UserId) -> StoreResult<Option<EarningsSnapshot>> {
        let key = Self::user_key(user_id)?;
        match self
            .snapshots
            .get(key)
            .map_err(|e| StoreError::database("Failed to get snapshot", e))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_snapshot(&self, snapshot: &EarningsSnapshot) -> StoreResult<()> {
        let key = Self::user_key(&snapshot.user_id)?;
        self.snapshots
            .insert(key, Self::serialize(snapshot)?)
            .map_err(|e| StoreError::database("Failed to save snapshot", e))?;
        Ok(())
    }

    fn snapshot_rows(&self, active_only: bool) -> StoreResult<Vec<EarningsSnapshot>> {
        let mut rows = Vec::new();
        for item in self.snapshots.iter() {
            let (_, value) =
                item.map_err(|e| StoreError::database("Failed to iterate snapshots", e))?;
            let snapshot: EarningsSnapshot = Self::deserialize(&value)?;
            if !active_only || snapshot.is_active {
                rows.push(snapshot);
            }
        }
        Ok(rows)
    }

    fn flag_snapshot(&self, user_id: &UserId, active: bool) -> StoreResult<bool> {
        match self.get_snapshot_row(user_id)? {
            Some(mut snapshot) => {
                snapshot.is_active = active;
                self.put_snapshot(&snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_snapshot(&self, user_id: &UserId) -> StoreResult<bool> {
        let key = Self::user_key(user_id)?;
        let removed = self
            .snapshots
            .remove(key)
            .map_err(|e| StoreError::database("Failed to delete snapshot", e))?;
        Ok(removed.is_some())
    }

    // ==================== Helpers ====================

    fn serialize<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn user_key(id: &UserId) -> StoreResult<Vec<u8>> {
        let bytes = id.as_str().as_bytes();
        if bytes.is_empty() || bytes.contains(&KEY_SEPARATOR) {
            return Err(StoreError::InvalidKey(format!("unusable user id {:?}", id.as_str())));
        }
        Ok(bytes.to_vec())
    }

    fn edge_key(referrer: &UserId, recruit: &UserId) -> StoreResult<Vec<u8>> {
        let mut key = Self::user_key(referrer)?;
        key.push(KEY_SEPARATOR);
        key.extend_from_slice(&Self::user_key(recruit)?);
        Ok(key)
    }

    fn id_from_bytes(bytes: &[u8]) -> StoreResult<UserId> {
        std::str::from_utf8(bytes)
            .map(UserId::from)
            .map_err(|e| StoreError::InvalidKey(e.to_string()))
    }

    fn recruit_count(bytes: Option<&[u8]>) -> StoreResult<u64> {
        match bytes {
            None => Ok(0),
            Some(raw) => <[u8; 8]>::try_from(raw)
                .map(u64::from_be_bytes)
                .map_err(|_| StoreError::Serialization(format!("bad recruit count of {} bytes", raw.len()))),
        }
    }

    fn finish<T>(result: Result<T, TransactionError<StoreError>>, context: &str) -> StoreResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(StoreError::database(context, e)),
        }
    }
}

fn sort_users(users: &mut [UserRecord]) {
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl UserDirectory for SledStore {
    async fn find_by_id(&self, user_id: &UserId) -> ReferralResult<Option<UserRecord>> {
        self.get_user(user_id).map_err(|e| e.into_directory("find_by_id"))
    }

    async fn find_children_of(
        &self,
        parents: &HashSet<UserId>,
        filter: ActivityFilter,
    ) -> ReferralResult<Vec<UserRecord>> {
        self.children_of(parents, filter)
            .map_err(|e| e.into_directory("find_children_of"))
    }

    async fn find_referrers(&self) -> ReferralResult<Vec<UserRecord>> {
        self.referrers().map_err(|e| e.into_directory("find_referrers"))
    }
}

#[async_trait]
impl SnapshotStore for SledStore {
    async fn get_snapshot(&self, user_id: &UserId) -> ReferralResult<Option<EarningsSnapshot>> {
        self.get_snapshot_row(user_id)
            .map_err(|e| e.into_snapshot("get"))
    }

    async fn upsert_snapshot(&self, snapshot: &EarningsSnapshot) -> ReferralResult<()> {
        self.put_snapshot(snapshot).map_err(|e| e.into_snapshot("upsert"))
    }

    async fn list_snapshots(&self, active_only: bool) -> ReferralResult<Vec<EarningsSnapshot>> {
        self.snapshot_rows(active_only)
            .map_err(|e| e.into_snapshot("list"))
    }

    async fn set_snapshot_active(&self, user_id: &UserId, active: bool) -> ReferralResult<bool> {
        self.flag_snapshot(user_id, active)
            .map_err(|e| e.into_snapshot("set_active"))
    }

    async fn delete_snapshot(&self, user_id: &UserId) -> ReferralResult<bool> {
        self.remove_snapshot(user_id)
            .map_err(|e| e.into_snapshot("delete"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use referral_core::{CommissionCalculator, ReferralEarnings};
    use tempfile::tempdir;

    fn user(id: &str, referrer: Option<&str>, active: bool) -> UserRecord {
        let mut user = UserRecord::new(id, id.to_uppercase(), format!("{}@example.rw", id))
            .with_active(active);
        if let Some(referrer) = referrer {
            user = user.referred_by(UserId::new(referrer));
        }
        user
    }

    fn snapshot(id: &str, counts: &[u64]) -> EarningsSnapshot {
        let breakdown = CommissionCalculator::rwf_default().calculate(counts).unwrap();
        let earnings = ReferralEarnings::new(UserId::new(id), breakdown, counts[0]);
        EarningsSnapshot::from_earnings(&earnings, chrono::Utc::now())
    }

    fn seeded(storage: &SledStore) {
        storage.insert_user(&user("r", None, true)).unwrap();
        storage.insert_user(&user("a", Some("r"), true)).unwrap();
        storage.insert_user(&user("b", Some("r"), false)).unwrap();
        storage.insert_user(&user("a1", Some("a"), true)).unwrap();
    }

    #[tokio::test]
    async fn test_sled_user_crud() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);

        let a = storage.find_by_id(&UserId::new("a")).await.unwrap().unwrap();
        assert_eq!(a.referred_by, Some(UserId::new("r")));

        let b = storage.set_user_active(&UserId::new("b"), true).unwrap();
        assert!(b.is_active);

        assert!(matches!(
            storage.set_user_active(&UserId::new("ghost"), true),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sled_insert_validation() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);

        let dup = storage.insert_user(&user("a", None, true)).unwrap_err();
        assert!(matches!(
            dup,
            StoreError::Rejected(ReferralError::DuplicateUser { .. })
        ));

        let orphan = storage.insert_user(&user("o", Some("ghost"), true)).unwrap_err();
        assert!(matches!(
            orphan,
            StoreError::Rejected(ReferralError::UnknownReferrer { .. })
        ));

        let selfish = storage.insert_user(&user("s", Some("s"), true)).unwrap_err();
        assert!(matches!(
            selfish,
            StoreError::Rejected(ReferralError::SelfReferral { .. })
        ));

        assert!(matches!(
            storage.insert_user(&user("", None, true)),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_sled_children_index() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);
        // shares a prefix with "a" but is a different parent
        storage.insert_user(&user("ab", Some("r"), true)).unwrap();
        storage.insert_user(&user("ab1", Some("ab"), true)).unwrap();

        let parents = HashSet::from([UserId::new("r")]);
        let all = storage.find_children_of(&parents, ActivityFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);

        let active = storage.find_active_children_of(&parents).await.unwrap();
        assert_eq!(active, HashSet::from([UserId::new("a"), UserId::new("ab")]));

        let under_a = storage.find_direct_referrals(&UserId::new("a")).await.unwrap();
        assert_eq!(under_a.len(), 1);
        assert_eq!(under_a[0].id, UserId::new("a1"));

        let referrers: Vec<UserId> = storage
            .find_referrers()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(referrers.len(), 3);
        assert!(referrers.contains(&UserId::new("ab")));
    }

    #[tokio::test]
    async fn test_sled_import_batch() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        storage.insert_user(&user("root", None, true)).unwrap();

        let count = storage
            .import_users(vec![
                user("grandchild", Some("child"), true),
                user("child", Some("root"), true),
            ])
            .unwrap();
        assert_eq!(count, 2);

        let err = storage
            .import_users(vec![user("x", Some("y"), true), user("y", Some("x"), true)])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(ReferralError::ReferralCycle { .. })
        ));
        assert_eq!(storage.stats().unwrap().total_users, 3);
    }

    #[tokio::test]
    async fn test_sled_snapshot_operations() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();

        storage.upsert_snapshot(&snapshot("r", &[2, 1, 0])).await.unwrap();
        storage.upsert_snapshot(&snapshot("a", &[1])).await.unwrap();

        let r = storage.get_snapshot(&UserId::new("r")).await.unwrap().unwrap();
        assert_eq!(r.total_earnings, 9500);
        assert!(r.verify_invariant().is_ok());

        assert!(storage.set_snapshot_active(&UserId::new("a"), false).await.unwrap());
        assert_eq!(storage.list_snapshots(true).await.unwrap().len(), 1);
        assert_eq!(storage.list_snapshots(false).await.unwrap().len(), 2);

        assert!(storage.delete_snapshot(&UserId::new("a")).await.unwrap());
        assert!(!storage.delete_snapshot(&UserId::new("a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_sled_remove_user_cascades() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);
        storage.upsert_snapshot(&snapshot("b", &[0])).await.unwrap();

        let removed = storage.remove_user(&UserId::new("b")).unwrap();
        assert!(removed.is_some());
        assert!(storage.get_snapshot(&UserId::new("b")).await.unwrap().is_none());

        let children = storage.find_direct_referrals(&UserId::new("r")).await.unwrap();
        assert_eq!(children.len(), 1);
        assert!(storage.remove_user(&UserId::new("b")).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sled_remove_refuses_user_with_recruits() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        storage.insert_user(&user("r", None, true)).unwrap();
        storage.insert_user(&user("a", Some("r"), true)).unwrap();

        let err = storage.remove_user(&UserId::new("r")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(ReferralError::HasRecruits { recruits: 1, .. })
        ));
        assert_eq!(storage.stats().unwrap().total_users, 2);

        storage.remove_user(&UserId::new("a")).unwrap();
        assert_eq!(storage.stats().unwrap().referrers, 0);
        storage.remove_user(&UserId::new("r")).unwrap();

        // a new user under the old id starts with an empty team
        storage.insert_user(&user("r", None, true)).unwrap();
        assert!(storage.find_direct_referrals(&UserId::new("r")).await.unwrap().is_empty());
        assert!(storage.find_referrers().await.unwrap().is_empty());

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.referrers, 0);
    }

    #[tokio::test]
    async fn test_sled_activate_after_remove() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);

        storage.remove_user(&UserId::new("b")).unwrap();
        assert!(matches!(
            storage.set_user_active(&UserId::new("b"), true),
            Err(StoreError::NotFound { .. })
        ));
        assert!(storage.find_by_id(&UserId::new("b")).await.unwrap().is_none());
        assert_eq!(storage.stats().unwrap().total_users, 3);
    }

    #[tokio::test]
    async fn test_sled_stats() {
        let dir = tempdir().unwrap();
        let storage = SledStore::open(dir.path()).unwrap();
        seeded(&storage);
        storage.upsert_snapshot(&snapshot("r", &[1, 1])).await.unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.active_users, 3);
        assert_eq!(stats.referrers, 2);
        assert_eq!(stats.snapshots, 1);
        assert_eq!(stats.active_snapshots, 1);
    }

    #[tokio::test]
    async fn test_sled_persistence() {
        let dir = tempdir().unwrap();

        {
            let storage = SledStore::open(dir.path()).unwrap();
            seeded(&storage);
            storage.flush().unwrap();
        }

        {
            let storage = SledStore::open(dir.path()).unwrap();
            let referrers = storage.find_referrers().await.unwrap();
            assert_eq!(referrers.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_sled_temporary_config() {
        let storage = SledStore::new(&StorageConfig::test()).unwrap();
        seeded(&storage);
        assert_eq!(storage.stats().unwrap().total_users, 4);

        storage.clear().unwrap();
        assert_eq!(storage.stats().unwrap().total_users, 0);
    }
}
