//! Listing Arguments
//!
//! Paging and leaderboard options shared by the listing commands.

use clap::Args;
use referral_core::{ListingQuery, PageRequest, ReferralResult};

/// Page selection
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Page size (0 = configured default)
    #[arg(long, default_value = "0")]
    pub page_size: u32,
}

impl PageArgs {
    pub fn to_request(self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Leaderboard options
#[derive(Args, Debug, Clone)]
pub struct LeaderboardArgs {
    #[command(flatten)]
    pub paging: PageArgs,

    /// Substring match on name or email
    #[arg(short, long)]
    pub search: Option<String>,

    /// Registration window (7d, 30d, 90d, 1y, all)
    #[arg(short, long, default_value = "all")]
    pub range: String,

    /// Sort key (total-earnings, referral-count, active-referrals, conversion-rate)
    #[arg(long, default_value = "total-earnings")]
    pub sort: String,
}

impl LeaderboardArgs {
    /// Build the engine query
    pub fn to_query(&self) -> ReferralResult<ListingQuery> {
        let mut query = ListingQuery::new(self.paging.page, self.paging.page_size);
        if let Some(search) = &self.search {
            query = query.with_search(search.as_str());
        }
        query.parse_options(Some(&self.range), Some(&self.sort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use referral_core::{SortKey, TimeRange};

    #[test]
    fn test_to_query() {
        let args = LeaderboardArgs {
            paging: PageArgs {
                page: 2,
                page_size: 25,
            },
            search: Some("uwase".to_string()),
            range: "30d".to_string(),
            sort: "conversion-rate".to_string(),
        };

        let query = args.to_query().unwrap();
        assert_eq!(query.page, PageRequest::new(2, 25));
        assert_eq!(query.search.as_deref(), Some("uwase"));
        assert_eq!(query.time_range, TimeRange::Last30Days);
        assert_eq!(query.sort_by, SortKey::ConversionRate);
    }

    #[test]
    fn test_bad_range_rejected() {
        let args = LeaderboardArgs {
            paging: PageArgs {
                page: 1,
                page_size: 0,
            },
            search: None,
            range: "fortnight".to_string(),
            sort: "total-earnings".to_string(),
        };
        assert!(args.to_query().is_err());
    }
}
