//! Team Tree Types
//!
//! Labeled per-level view used by "my team" pages.

use super::{ProfileSummary, UserId};
use serde::{Deserialize, Serialize};

/// A member of someone's team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(flatten)]
    pub profile: ProfileSummary,
    pub level: u32,
    pub referred_by: Option<UserId>,
    /// RWF this member earns the tree owner (0 when inactive)
    pub earning_contribution: u64,
}

/// Per-level team figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelStats {
    pub level: u32,
    pub members: u64,
    pub active_members: u64,
    pub earnings: u64,
}

/// Team totals
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeStats {
    pub levels: Vec<LevelStats>,
    pub total_members: u64,
    pub active_members: u64,
    pub total_earnings: u64,
}

/// A user's team, level by level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralTree {
    pub user_id: UserId,
    /// Index 0 = level 1
    pub levels: Vec<Vec<TeamMember>>,
    pub stats: TreeStats,
}

impl ReferralTree {
    /// Members at a 1-based level
    pub fn level(&self, level: u32) -> &[TeamMember] {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find a member anywhere in the tree
    pub fn find(&self, user_id: &UserId) -> Option<&TeamMember> {
        self.levels
            .iter()
            .flatten()
            .find(|m| &m.profile.user_id == user_id)
    }
}
