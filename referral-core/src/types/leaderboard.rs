//! Leaderboard Types
//!
//! Query options and result rows for the admin referrer listing.

use super::{PageRequest, Pagination, ProfileSummary, ReferralEarnings};
use crate::error::{ReferralError, ReferralResult};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Registration window applied to the referrer's own account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "1y")]
    LastYear,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Window length; `None` for all time
    pub fn window(&self) -> Option<Duration> {
        match self {
            Self::Last7Days => Some(Duration::days(7)),
            Self::Last30Days => Some(Duration::days(30)),
            Self::Last90Days => Some(Duration::days(90)),
            Self::LastYear => Some(Duration::days(365)),
            Self::All => None,
        }
    }

    /// Earliest admitted registration time
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }

    pub fn admits(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.cutoff(now).map_or(true, |cutoff| created_at >= cutoff)
    }
}

impl FromStr for TimeRange {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "1y" | "365d" => Ok(Self::LastYear),
            "all" | "" => Ok(Self::All),
            other => Err(ReferralError::UnknownListingOption {
                option: "time range".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Leaderboard ordering (always descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    TotalEarnings,
    ReferralCount,
    ActiveReferrals,
    ConversionRate,
}

impl FromStr for SortKey {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "totalearnings" | "earnings" => Ok(Self::TotalEarnings),
            "referralcount" | "referrals" | "totalreferrals" => Ok(Self::ReferralCount),
            "activereferrals" | "active" => Ok(Self::ActiveReferrals),
            "conversionrate" | "conversion" => Ok(Self::ConversionRate),
            _ => Err(ReferralError::UnknownListingOption {
                option: "sort key".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Leaderboard request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    pub page: PageRequest,
    pub search: Option<String>,
    pub time_range: TimeRange,
    pub sort_by: SortKey,
}

impl ListingQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: PageRequest::new(page, page_size),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() { None } else { Some(search) };
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = range;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Parse the string options an outer layer receives
    pub fn parse_options(
        mut self,
        time_range: Option<&str>,
        sort_by: Option<&str>,
    ) -> ReferralResult<Self> {
        if let Some(range) = time_range {
            self.time_range = range.parse()?;
        }
        if let Some(sort) = sort_by {
            self.sort_by = sort.parse()?;
        }
        Ok(self)
    }
}

/// One referrer on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerRow {
    /// 1-based position in the sorted result
    pub rank: u32,
    pub profile: ProfileSummary,
    pub earnings: ReferralEarnings,
    /// Percent, 2 dp
    pub conversion_rate: Decimal,
    /// 0..=100, 2 dp
    pub activity_score: Decimal,
}

/// Aggregates over every referrer on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_referrers: u64,
    pub total_referrals: u64,
    pub total_active_referrals: u64,
    /// Active users per level, index 0 = level 1
    pub level_counts: Vec<u64>,
    /// RWF per level, index 0 = level 1
    pub level_earnings: Vec<u64>,
    pub total_payout: u64,
    pub average_earnings: Decimal,
    pub average_conversion_rate: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// One leaderboard page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerListing {
    pub rows: Vec<ReferrerRow>,
    pub top_performers: Vec<ReferrerRow>,
    pub platform_stats: PlatformStats,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_parse() {
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Last7Days);
        assert_eq!("1Y".parse::<TimeRange>().unwrap(), TimeRange::LastYear);
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("2w".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_time_range_admits() {
        let now = Utc::now();
        assert!(TimeRange::Last7Days.admits(now - Duration::days(6), now));
        assert!(!TimeRange::Last7Days.admits(now - Duration::days(8), now));
        assert!(TimeRange::All.admits(now - Duration::days(5000), now));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("totalEarnings".parse::<SortKey>().unwrap(), SortKey::TotalEarnings);
        assert_eq!("conversion_rate".parse::<SortKey>().unwrap(), SortKey::ConversionRate);
        assert_eq!("active-referrals".parse::<SortKey>().unwrap(), SortKey::ActiveReferrals);
        assert!("name".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_time_range_serde_names() {
        let json = serde_json::to_string(&TimeRange::Last90Days).unwrap();
        assert_eq!(json, "\"90d\"");
    }

    #[test]
    fn test_listing_query_options() {
        let query = ListingQuery::new(1, 10)
            .with_search("   ")
            .parse_options(Some("30d"), Some("referrals"))
            .unwrap();

        assert!(query.search.is_none());
        assert_eq!(query.time_range, TimeRange::Last30Days);
        assert_eq!(query.sort_by, SortKey::ReferralCount);
    }
}
