//! Team Tree Builder
//!
//! Level 1 lists every direct recruit. Each deeper level lists every recruit
//! of an active member one level up, so the active members of level k are
//! exactly the resolver's level-k set and the tree's total earnings equal the
//! live computation.

use std::collections::HashSet;

use crate::commission::CommissionCalculator;
use crate::error::{ReferralError, ReferralResult};
use crate::storage::UserDirectory;
use crate::types::{
    ActivityFilter, LevelStats, ProfileSummary, ReferralTree, TeamMember, TreeStats, UserId,
};

/// Team tree builder
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    calculator: CommissionCalculator,
}

impl TreeBuilder {
    pub fn new(calculator: CommissionCalculator) -> Self {
        Self { calculator }
    }

    /// Build the tree below `root`; an unknown root yields empty levels
    pub async fn build<D>(&self, directory: &D, root: &UserId) -> ReferralResult<ReferralTree>
    where
        D: UserDirectory + ?Sized,
    {
        let max_depth = self.calculator.rates().max_depth();
        let mut levels: Vec<Vec<TeamMember>> = Vec::with_capacity(max_depth as usize);
        let mut level_stats = Vec::with_capacity(max_depth as usize);
        let mut visited: HashSet<UserId> = HashSet::from([root.clone()]);
        let mut parents: HashSet<UserId> = HashSet::from([root.clone()]);

        for level in 1..=max_depth {
            let records = if parents.is_empty() {
                Vec::new()
            } else {
                directory.find_children_of(&parents, ActivityFilter::All).await?
            };

            let mut stats = LevelStats {
                level,
                ..LevelStats::default()
            };
            let mut members = Vec::with_capacity(records.len());
            let mut next_parents = HashSet::new();

            for record in records {
                if !visited.insert(record.id.clone()) {
                    continue;
                }
                let contribution = self.calculator.contribution(level, record.is_active);

                stats.members += 1;
                if record.is_active {
                    stats.active_members += 1;
                    next_parents.insert(record.id.clone());
                }
                stats.earnings = stats
                    .earnings
                    .checked_add(contribution)
                    .ok_or(ReferralError::EarningsOverflow { level })?;

                members.push(TeamMember {
                    profile: ProfileSummary::from(&record),
                    level,
                    referred_by: record.referred_by.clone(),
                    earning_contribution: contribution,
                });
            }

            levels.push(members);
            level_stats.push(stats);
            parents = next_parents;
        }

        let mut total_earnings = 0u64;
        for stats in &level_stats {
            total_earnings = total_earnings
                .checked_add(stats.earnings)
                .ok_or(ReferralError::EarningsOverflow { level: stats.level })?;
        }

        let stats = TreeStats {
            total_members: level_stats.iter().map(|s| s.members).sum(),
            active_members: level_stats.iter().map(|s| s.active_members).sum(),
            total_earnings,
            levels: level_stats,
        };

        Ok(ReferralTree {
            user_id: root.clone(),
            levels,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::UserRecord;

    async fn add(store: &MemoryStore, id: &str, referrer: Option<&str>, active: bool) {
        let mut user = UserRecord::new(id, id, format!("{}@example.com", id))
            .with_mobile("+250780000000")
            .with_active(active);
        if let Some(referrer) = referrer {
            user = user.referred_by(UserId::new(referrer));
        }
        store.insert_user(user).await.unwrap();
    }

    #[tokio::test]
    async fn test_tree_lists_inactive_members() {
        let store = MemoryStore::new();
        add(&store, "r", None, true).await;
        add(&store, "a", Some("r"), true).await;
        add(&store, "c", Some("r"), false).await;
        add(&store, "a1", Some("a"), false).await;
        add(&store, "c1", Some("c"), true).await;

        let tree = TreeBuilder::default().build(&store, &UserId::new("r")).await.unwrap();

        assert_eq!(tree.level(1).len(), 2);
        // c is inactive, so c1 is never reached
        assert_eq!(tree.level(2).len(), 1);
        assert!(tree.find(&UserId::new("c1")).is_none());

        let a1 = tree.find(&UserId::new("a1")).unwrap();
        assert_eq!(a1.level, 2);
        assert_eq!(a1.earning_contribution, 0);
        assert_eq!(a1.referred_by, Some(UserId::new("a")));
        assert_eq!(a1.profile.mobile.as_deref(), Some("+250780000000"));

        assert_eq!(tree.stats.total_members, 3);
        assert_eq!(tree.stats.active_members, 1);
        assert_eq!(tree.stats.total_earnings, 4000);
        assert_eq!(tree.stats.levels[0].members, 2);
        assert_eq!(tree.stats.levels[0].earnings, 4000);
    }

    #[tokio::test]
    async fn test_tree_depth_follows_schedule() {
        let store = MemoryStore::new();
        add(&store, "r", None, true).await;
        add(&store, "a", Some("r"), true).await;
        add(&store, "b", Some("a"), true).await;
        add(&store, "c", Some("b"), true).await;
        add(&store, "d", Some("c"), true).await;

        let tree = TreeBuilder::default().build(&store, &UserId::new("r")).await.unwrap();
        assert_eq!(tree.levels.len(), 3);
        assert_eq!(tree.stats.total_earnings, 6400);
        assert!(tree.find(&UserId::new("d")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_root_empty_tree() {
        let store = MemoryStore::new();
        let tree = TreeBuilder::default().build(&store, &UserId::new("ghost")).await.unwrap();
        assert_eq!(tree.stats.total_members, 0);
        assert!(tree.levels.iter().all(Vec::is_empty));
    }
}
