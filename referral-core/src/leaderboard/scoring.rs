//! Activity Score
//!
//! `min(max_score, conversion_rate * conversion_weight
//!     + min(total_referrals * per_referral, referral_cap))`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReferralError, ReferralResult};

/// Activity score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityScoreWeights {
    /// Applied to the conversion percentage
    pub conversion_weight: Decimal,
    /// Points per direct recruit
    pub per_referral: Decimal,
    /// Ceiling on the recruit component
    pub referral_cap: Decimal,
    pub max_score: Decimal,
}

impl Default for ActivityScoreWeights {
    fn default() -> Self {
        Self {
            conversion_weight: Decimal::new(6, 1),
            per_referral: Decimal::from(2),
            referral_cap: Decimal::from(40),
            max_score: Decimal::ONE_HUNDRED,
        }
    }
}

impl ActivityScoreWeights {
    /// Validate weights
    pub fn validate(&self) -> ReferralResult<()> {
        let fields = [
            ("conversion_weight", self.conversion_weight),
            ("per_referral", self.per_referral),
            ("referral_cap", self.referral_cap),
            ("max_score", self.max_score),
        ];
        for (name, value) in fields {
            if value.is_sign_negative() {
                return Err(ReferralError::Configuration(format!(
                    "activity weight {} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Score a referrer, rounded to 2 dp.
    ///
    /// A component too large for `Decimal` saturates to its ceiling.
    pub fn score(&self, conversion_rate: Decimal, total_referrals: u64) -> Decimal {
        let recruit_points = Decimal::from(total_referrals)
            .checked_mul(self.per_referral)
            .map_or(self.referral_cap, |points| points.min(self.referral_cap));
        let raw = conversion_rate
            .checked_mul(self.conversion_weight)
            .and_then(|points| points.checked_add(recruit_points));
        raw.map_or(self.max_score, |raw| raw.min(self.max_score))
            .round_dp(2)
    }
}
