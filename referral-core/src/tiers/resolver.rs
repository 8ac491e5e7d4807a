//! Tier Resolver
//!
//! Breadth-first walk from a root user. Level 1 is the root's active direct
//! recruits; level k+1 is the active recruits of level k. An inactive user is
//! never counted and never expanded, so its sub-tree is unreachable.

use std::collections::HashSet;

use crate::commission::DEFAULT_MAX_DEPTH;
use crate::error::ReferralResult;
use crate::storage::UserDirectory;
use crate::types::UserId;

/// Active identifier sets per level for one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSets {
    pub root: UserId,
    /// Index 0 = level 1
    pub levels: Vec<HashSet<UserId>>,
}

impl TierSets {
    /// Identifiers at a 1-based level
    pub fn level(&self, level: u32) -> Option<&HashSet<UserId>> {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
    }

    /// Active counts per level, index 0 = level 1
    pub fn counts(&self) -> Vec<u64> {
        self.levels.iter().map(|set| set.len() as u64).collect()
    }

    /// Active users across all levels
    pub fn total(&self) -> u64 {
        self.levels.iter().map(|set| set.len() as u64).sum()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.levels.iter().any(|set| set.contains(user_id))
    }
}

/// Tier resolver
#[derive(Debug, Clone, Copy)]
pub struct TierResolver {
    max_depth: u32,
}

impl Default for TierResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TierResolver {
    /// Create resolver walking `max_depth` levels
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Resolve the active sets below `root`.
    ///
    /// Always returns `max_depth` levels; an unknown root resolves to empty
    /// sets. Users already placed (or the root itself) are skipped, which
    /// keeps the levels disjoint even if the directory holds a cycle.
    pub async fn resolve<D>(&self, directory: &D, root: &UserId) -> ReferralResult<TierSets>
    where
        D: UserDirectory + ?Sized,
    {
        let mut levels = Vec::with_capacity(self.max_depth as usize);
        let mut visited: HashSet<UserId> = HashSet::from([root.clone()]);
        let mut frontier: HashSet<UserId> = HashSet::from([root.clone()]);

        for _ in 0..self.max_depth {
            let next: HashSet<UserId> = if frontier.is_empty() {
                HashSet::new()
            } else {
                directory
                    .find_active_children_of(&frontier)
                    .await?
                    .into_iter()
                    .filter(|id| visited.insert(id.clone()))
                    .collect()
            };

            levels.push(next.clone());
            frontier = next;
        }

        Ok(TierSets {
            root: root.clone(),
            levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::UserRecord;

    async fn add(store: &MemoryStore, id: &str, referrer: Option<&str>, active: bool) {
        let mut user = UserRecord::new(id, id.to_uppercase(), format!("{}@example.com", id))
            .with_active(active);
        if let Some(referrer) = referrer {
            user = user.referred_by(UserId::new(referrer));
        }
        store.insert_user(user).await.unwrap();
    }

    fn ids(names: &[&str]) -> HashSet<UserId> {
        names.iter().map(|n| UserId::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_chain_resolution() {
        let store = MemoryStore::new();
        add(&store, "r", None, true).await;
        add(&store, "a", Some("r"), true).await;
        add(&store, "b", Some("a"), true).await;
        add(&store, "c", Some("b"), true).await;
        add(&store, "d", Some("c"), true).await;

        let sets = TierResolver::default()
            .resolve(&store, &UserId::new("r"))
            .await
            .unwrap();

        assert_eq!(sets.levels.len(), 3);
        assert_eq!(sets.level(1), Some(&ids(&["a"])));
        assert_eq!(sets.level(2), Some(&ids(&["b"])));
        assert_eq!(sets.level(3), Some(&ids(&["c"])));
        // fourth generation is beyond the schedule
        assert!(!sets.contains(&UserId::new("d")));
        assert_eq!(sets.counts(), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_inactive_blocks_subtree_only() {
        let store = MemoryStore::new();
        add(&store, "r", None, true).await;
        add(&store, "a", Some("r"), true).await;
        add(&store, "x", Some("r"), false).await;
        add(&store, "a1", Some("a"), true).await;
        add(&store, "x1", Some("x"), true).await;

        let sets = TierResolver::default()
            .resolve(&store, &UserId::new("r"))
            .await
            .unwrap();

        assert_eq!(sets.level(1), Some(&ids(&["a"])));
        assert_eq!(sets.level(2), Some(&ids(&["a1"])));
        assert_eq!(sets.total(), 2);
    }

    #[tokio::test]
    async fn test_unknown_root_is_empty() {
        let store = MemoryStore::new();
        let sets = TierResolver::new(2)
            .resolve(&store, &UserId::new("ghost"))
            .await
            .unwrap();

        assert_eq!(sets.counts(), vec![0, 0]);
    }
}
