//! Commission Calculator
//!
//! Converts per-level active counts into RWF earnings:
//! 1. Look up the tier rate
//! 2. Multiply by the level's active count
//! 3. Sum the tiers into the total

use super::CommissionRates;
use crate::error::{ReferralError, ReferralResult};
use crate::types::{CommissionBreakdown, TierEarnings};

/// Commission calculator
#[derive(Debug, Clone, Default)]
pub struct CommissionCalculator {
    rates: CommissionRates,
}

impl CommissionCalculator {
    /// Create calculator with a rate schedule
    pub fn new(rates: CommissionRates) -> Self {
        Self { rates }
    }

    /// Create calculator with the platform's RWF schedule
    pub fn rwf_default() -> Self {
        Self::new(CommissionRates::rwf_default())
    }

    /// Calculate earnings from counts, index 0 = level 1.
    ///
    /// Missing levels count as zero; counts beyond the schedule earn nothing.
    pub fn calculate(&self, counts: &[u64]) -> ReferralResult<CommissionBreakdown> {
        let mut tiers = Vec::with_capacity(self.rates.max_depth() as usize);
        let mut total: u64 = 0;

        for (level, rate) in self.rates.levels() {
            let count = counts.get(level as usize - 1).copied().unwrap_or(0);
            let earnings = count
                .checked_mul(rate)
                .ok_or(ReferralError::EarningsOverflow { level })?;
            total = total
                .checked_add(earnings)
                .ok_or(ReferralError::EarningsOverflow { level })?;

            tiers.push(TierEarnings {
                level,
                count,
                rate,
                earnings,
            });
        }

        Ok(CommissionBreakdown {
            tiers,
            total_earnings: total,
        })
    }

    /// Contribution of a single member at a level
    pub fn contribution(&self, level: u32, is_active: bool) -> u64 {
        if !is_active {
            return 0;
        }
        self.rates.rate_for(level).unwrap_or(0)
    }

    /// Get rate schedule
    pub fn rates(&self) -> &CommissionRates {
        &self.rates
    }
}
