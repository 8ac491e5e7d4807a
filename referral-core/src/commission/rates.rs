//! Tier Rate Schedule
//!
//! RWF paid per active referral at each level. The schedule's length is the
//! traversal depth.

use crate::error::{ReferralError, ReferralResult};
use serde::{Deserialize, Serialize};

/// Default number of tiers walked
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Default RWF rates: direct, second, third generation
pub const DEFAULT_TIER_RATES: [u64; DEFAULT_MAX_DEPTH as usize] = [4000, 1500, 900];

/// Per-tier commission rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct CommissionRates {
    rates: Vec<u64>,
}

impl CommissionRates {
    /// Create a schedule; index 0 is level 1
    pub fn new(rates: Vec<u64>) -> ReferralResult<Self> {
        if rates.is_empty() {
            return Err(ReferralError::Configuration(
                "rate schedule must define at least one tier".to_string(),
            ));
        }
        if u32::try_from(rates.len()).is_err() {
            return Err(ReferralError::Configuration(
                "rate schedule is too long".to_string(),
            ));
        }
        Ok(Self { rates })
    }

    /// The platform's RWF schedule (4000 / 1500 / 900)
    pub fn rwf_default() -> Self {
        Self {
            rates: DEFAULT_TIER_RATES.to_vec(),
        }
    }

    /// Parse a comma-separated schedule such as `4000,1500,900`
    pub fn parse(s: &str) -> ReferralResult<Self> {
        let rates = s
            .split(',')
            .map(|part| {
                part.trim().parse::<u64>().map_err(|_| {
                    ReferralError::Configuration(format!("invalid tier rate '{}'", part.trim()))
                })
            })
            .collect::<ReferralResult<Vec<u64>>>()?;
        Self::new(rates)
    }

    /// Rate for a 1-based level; `None` beyond the schedule
    pub fn rate_for(&self, level: u32) -> Option<u64> {
        level
            .checked_sub(1)
            .and_then(|i| self.rates.get(i as usize))
            .copied()
    }

    /// Number of tiers
    pub fn max_depth(&self) -> u32 {
        self.rates.len() as u32
    }

    /// `(level, rate)` pairs in level order
    pub fn levels(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.rates
            .iter()
            .enumerate()
            .map(|(i, rate)| (i as u32 + 1, *rate))
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.rates
    }
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self::rwf_default()
    }
}

impl TryFrom<Vec<u64>> for CommissionRates {
    type Error = ReferralError;

    fn try_from(rates: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(rates)
    }
}

impl From<CommissionRates> for Vec<u64> {
    fn from(rates: CommissionRates) -> Self {
        rates.rates
    }
}

impl std::fmt::Display for CommissionRates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.rates.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let rates = CommissionRates::default();
        assert_eq!(rates.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(rates.rate_for(1), Some(4000));
        assert_eq!(rates.rate_for(2), Some(1500));
        assert_eq!(rates.rate_for(3), Some(900));
        assert_eq!(rates.rate_for(0), None);
        assert_eq!(rates.rate_for(4), None);
    }

    #[test]
    fn test_parse_schedule() {
        let rates = CommissionRates::parse("5000, 2000").unwrap();
        assert_eq!(rates.max_depth(), 2);
        assert_eq!(rates.to_string(), "5000,2000");

        assert!(CommissionRates::parse("").is_err());
        assert!(CommissionRates::parse("100,abc").is_err());
    }

    #[test]
    fn test_empty_schedule_rejected() {
        assert!(CommissionRates::new(Vec::new()).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let rates: CommissionRates = serde_json::from_str("[10, 5]").unwrap();
        assert_eq!(rates.levels().collect::<Vec<_>>(), vec![(1, 10), (2, 5)]);

        let empty: Result<CommissionRates, _> = serde_json::from_str("[]");
        assert!(empty.is_err());
    }
}
