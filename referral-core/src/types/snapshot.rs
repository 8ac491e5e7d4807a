//! Multilevel Earnings Snapshot
//!
//! A denormalized cache row, one per user. Written in full on every
//! recomputation; only the writer keeps `total_earnings` in step with the
//! tiers, so readers check the invariant before trusting a row.

use super::{ReferralEarnings, UserId};
use crate::error::{ReferralError, ReferralResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cached figures for one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub level: u32,
    pub count: u64,
    pub earnings: u64,
    pub last_updated: DateTime<Utc>,
}

/// Cached multilevel earnings for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsSnapshot {
    pub user_id: UserId,
    pub levels: Vec<LevelSnapshot>,
    pub total_earnings: u64,
    /// Direct recruits, active or not, at write time
    #[serde(default)]
    pub total_referrals: u64,
    pub last_calculated: DateTime<Utc>,
    /// Included in aggregate listings
    pub is_active: bool,
}

impl EarningsSnapshot {
    /// Build a full row from a live computation, stamping every timestamp with `now`
    pub fn from_earnings(earnings: &ReferralEarnings, now: DateTime<Utc>) -> Self {
        let levels = earnings
            .tiers
            .iter()
            .map(|t| LevelSnapshot {
                level: t.level,
                count: t.count,
                earnings: t.earnings,
                last_updated: now,
            })
            .collect();

        Self {
            user_id: earnings.user_id.clone(),
            levels,
            total_earnings: earnings.total_earnings,
            total_referrals: earnings.total_referrals,
            last_calculated: now,
            is_active: true,
        }
    }

    /// Cached level by 1-based number
    pub fn level(&self, level: u32) -> Option<&LevelSnapshot> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Check levels are numbered 1..=n and the total equals their sum
    pub fn verify_invariant(&self) -> ReferralResult<()> {
        for (index, level) in self.levels.iter().enumerate() {
            if level.level as usize != index + 1 {
                return Err(self.inconsistent(format!(
                    "level at position {} is numbered {}",
                    index + 1,
                    level.level
                )));
            }
        }

        let sum = self
            .levels
            .iter()
            .try_fold(0u64, |acc, l| acc.checked_add(l.earnings))
            .ok_or_else(|| self.inconsistent("tier earnings overflow".to_string()))?;

        if sum != self.total_earnings {
            return Err(self.inconsistent(format!(
                "total {} != tier sum {}",
                self.total_earnings, sum
            )));
        }
        Ok(())
    }

    /// Younger than `max_age` at `now`; no bound means always fresh
    pub fn is_fresh(&self, max_age: Option<Duration>, now: DateTime<Utc>) -> bool {
        match max_age {
            Some(max_age) => now - self.last_calculated <= max_age,
            None => true,
        }
    }

    /// Same counts and earnings as a live computation
    pub fn matches(&self, earnings: &ReferralEarnings) -> bool {
        self.user_id == earnings.user_id
            && self.total_earnings == earnings.total_earnings
            && self.levels.len() == earnings.tiers.len()
            && self
                .levels
                .iter()
                .zip(earnings.tiers.iter())
                .all(|(l, t)| l.level == t.level && l.count == t.count && l.earnings == t.earnings)
    }

    fn inconsistent(&self, details: String) -> ReferralError {
        ReferralError::SnapshotInconsistent {
            user_id: self.user_id.to_string(),
            details,
        }
    }
}

/// Result of a snapshot refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRefresh {
    pub snapshot: EarningsSnapshot,
    /// False when the upsert failed and only the computed value is available
    pub persisted: bool,
}

/// Where a cache-aside read was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    Snapshot,
    Recomputed,
}

/// Cache-aside read result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEarnings {
    pub snapshot: EarningsSnapshot,
    pub source: CacheSource,
    /// Only meaningful when recomputed
    pub persisted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommissionBreakdown, TierEarnings};

    fn sample_earnings() -> ReferralEarnings {
        ReferralEarnings::new(
            UserId::new("r"),
            CommissionBreakdown {
                tiers: vec![
                    TierEarnings { level: 1, count: 1, rate: 4000, earnings: 4000 },
                    TierEarnings { level: 2, count: 1, rate: 1500, earnings: 1500 },
                    TierEarnings { level: 3, count: 1, rate: 900, earnings: 900 },
                ],
                total_earnings: 6400,
            },
            1,
        )
    }

    #[test]
    fn test_from_earnings_stamps_all_timestamps() {
        let now = Utc::now();
        let snapshot = EarningsSnapshot::from_earnings(&sample_earnings(), now);

        assert!(snapshot.is_active);
        assert_eq!(snapshot.last_calculated, now);
        assert!(snapshot.levels.iter().all(|l| l.last_updated == now));
        assert_eq!(snapshot.level(3).unwrap().earnings, 900);
        assert!(snapshot.verify_invariant().is_ok());
        assert!(snapshot.matches(&sample_earnings()));
    }

    #[test]
    fn test_invariant_detects_patched_total() {
        let mut snapshot = EarningsSnapshot::from_earnings(&sample_earnings(), Utc::now());
        snapshot.total_earnings = 7000;

        let err = snapshot.verify_invariant().unwrap_err();
        assert_eq!(err.code(), "REF-SNAP-002");
    }

    #[test]
    fn test_invariant_detects_misnumbered_levels() {
        let mut snapshot = EarningsSnapshot::from_earnings(&sample_earnings(), Utc::now());
        snapshot.levels.swap(0, 1);
        assert!(snapshot.verify_invariant().is_err());
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        let mut snapshot = EarningsSnapshot::from_earnings(&sample_earnings(), now);
        snapshot.last_calculated = now - Duration::seconds(120);

        assert!(snapshot.is_fresh(None, now));
        assert!(snapshot.is_fresh(Some(Duration::seconds(300)), now));
        assert!(!snapshot.is_fresh(Some(Duration::seconds(60)), now));
    }
}
