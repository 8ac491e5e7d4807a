//! Earnings Types
//!
//! Output of the live computation: per-tier counts and RWF earnings.

use super::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier of a commission breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierEarnings {
    /// 1 = direct recruit
    pub level: u32,
    /// Active users counted at this level
    pub count: u64,
    /// RWF paid per active user
    pub rate: u64,
    pub earnings: u64,
}

/// Commission breakdown over every configured tier
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub tiers: Vec<TierEarnings>,
    pub total_earnings: u64,
}

impl CommissionBreakdown {
    /// Tier entry for a 1-based level
    pub fn tier(&self, level: u32) -> Option<&TierEarnings> {
        self.tiers.iter().find(|t| t.level == level)
    }

    /// Sum of per-tier earnings
    pub fn tier_sum(&self) -> Option<u64> {
        self.tiers
            .iter()
            .try_fold(0u64, |acc, t| acc.checked_add(t.earnings))
    }

    /// Total equals the sum of its tiers
    pub fn verify_additivity(&self) -> bool {
        self.tier_sum() == Some(self.total_earnings)
    }
}

/// Live multilevel earnings for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralEarnings {
    pub user_id: UserId,
    pub tiers: Vec<TierEarnings>,
    pub total_earnings: u64,
    /// Direct recruits, active or not
    pub total_referrals: u64,
    /// Active direct recruits
    pub active_referrals: u64,
    pub computed_at: DateTime<Utc>,
}

impl ReferralEarnings {
    /// Assemble from a breakdown and the direct-recruit count
    pub fn new(user_id: UserId, breakdown: CommissionBreakdown, total_referrals: u64) -> Self {
        let active_referrals = breakdown.tier(1).map(|t| t.count).unwrap_or(0);
        Self {
            user_id,
            tiers: breakdown.tiers,
            total_earnings: breakdown.total_earnings,
            total_referrals,
            active_referrals,
            computed_at: Utc::now(),
        }
    }

    /// Active users counted at a 1-based level
    pub fn count_at(&self, level: u32) -> u64 {
        self.tiers
            .iter()
            .find(|t| t.level == level)
            .map(|t| t.count)
            .unwrap_or(0)
    }

    /// RWF earned at a 1-based level
    pub fn earnings_at(&self, level: u32) -> u64 {
        self.tiers
            .iter()
            .find(|t| t.level == level)
            .map(|t| t.earnings)
            .unwrap_or(0)
    }

    /// Active users across all levels
    pub fn total_count(&self) -> u64 {
        self.tiers.iter().map(|t| t.count).sum()
    }

    /// Total equals the sum of its tiers
    pub fn verify_additivity(&self) -> bool {
        self.tiers
            .iter()
            .try_fold(0u64, |acc, t| acc.checked_add(t.earnings))
            == Some(self.total_earnings)
    }

    /// Active share of direct recruits, in percent (2 dp)
    pub fn conversion_rate(&self) -> Decimal {
        if self.total_referrals == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.active_referrals) * Decimal::ONE_HUNDRED
            / Decimal::from(self.total_referrals))
        .round_dp(2)
    }

    /// Zero earnings for a user nobody was found under
    pub fn is_empty(&self) -> bool {
        self.total_referrals == 0 && self.total_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_breakdown() -> CommissionBreakdown {
        CommissionBreakdown {
            tiers: vec![
                TierEarnings { level: 1, count: 2, rate: 4000, earnings: 8000 },
                TierEarnings { level: 2, count: 1, rate: 1500, earnings: 1500 },
                TierEarnings { level: 3, count: 0, rate: 900, earnings: 0 },
            ],
            total_earnings: 9500,
        }
    }

    #[test]
    fn test_breakdown_additivity() {
        let mut breakdown = sample_breakdown();
        assert!(breakdown.verify_additivity());

        breakdown.total_earnings += 1;
        assert!(!breakdown.verify_additivity());
    }

    #[test]
    fn test_earnings_accessors() {
        let earnings = ReferralEarnings::new(UserId::new("r"), sample_breakdown(), 3);
        assert_eq!(earnings.count_at(1), 2);
        assert_eq!(earnings.earnings_at(2), 1500);
        assert_eq!(earnings.count_at(4), 0);
        assert_eq!(earnings.active_referrals, 2);
        assert_eq!(earnings.total_count(), 3);
        assert!(earnings.verify_additivity());
    }

    #[test]
    fn test_conversion_rate() {
        let earnings = ReferralEarnings::new(UserId::new("r"), sample_breakdown(), 3);
        assert_eq!(earnings.conversion_rate(), Decimal::new(6667, 2));

        let empty = ReferralEarnings::new(UserId::new("n"), CommissionBreakdown::default(), 0);
        assert_eq!(empty.conversion_rate(), Decimal::ZERO);
        assert!(empty.is_empty());
    }
}
