//! Listing Assembly
//!
//! Turns one live computation per referrer into a leaderboard page. Stats and
//! the hall of fame cover every referrer; only `rows` honour search and time
//! filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use super::ActivityScoreWeights;
use crate::error::{ReferralError, ReferralResult};
use crate::types::{
    ListingQuery, Pagination, PlatformStats, ProfileSummary, ReferralEarnings, ReferrerListing,
    ReferrerRow, SortKey, UserRecord,
};

/// A referrer paired with its live earnings
#[derive(Debug, Clone)]
pub struct ReferrerEntry {
    pub user: UserRecord,
    pub earnings: ReferralEarnings,
}

/// Leaderboard assembler
#[derive(Debug, Clone)]
pub struct ListingBuilder {
    weights: ActivityScoreWeights,
    top_performers: usize,
    max_depth: u32,
}

impl ListingBuilder {
    /// Create assembler for a schedule of `max_depth` tiers
    pub fn new(weights: ActivityScoreWeights, top_performers: usize, max_depth: u32) -> Self {
        Self {
            weights,
            top_performers,
            max_depth,
        }
    }

    /// Build one page. `query.page` must already be normalized.
    pub fn build(
        &self,
        entries: Vec<ReferrerEntry>,
        query: &ListingQuery,
        now: DateTime<Utc>,
    ) -> ReferralResult<ReferrerListing> {
        let platform_stats = self.platform_stats(&entries, now)?;

        let mut top: Vec<&ReferrerEntry> = entries.iter().collect();
        top.sort_by(|a, b| compare(a, b, SortKey::TotalEarnings));
        let top_performers = top
            .into_iter()
            .take(self.top_performers)
            .enumerate()
            .map(|(i, e)| self.row(i, e))
            .collect();

        let mut filtered: Vec<&ReferrerEntry> = entries
            .iter()
            .filter(|e| query.time_range.admits(e.user.created_at, now))
            .filter(|e| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |needle| e.user.matches_search(needle))
            })
            .collect();
        filtered.sort_by(|a, b| compare(a, b, query.sort_by));

        let pagination = Pagination::new(query.page, filtered.len() as u64);
        let offset = pagination.offset();
        let rows = pagination
            .slice(&filtered)
            .iter()
            .enumerate()
            .map(|(i, e)| self.row(offset + i, e))
            .collect();

        Ok(ReferrerListing {
            rows,
            top_performers,
            platform_stats,
            pagination,
        })
    }

    /// Aggregates over every referrer
    pub fn platform_stats(
        &self,
        entries: &[ReferrerEntry],
        now: DateTime<Utc>,
    ) -> ReferralResult<PlatformStats> {
        let depth = self.max_depth as usize;
        let mut level_counts = vec![0u64; depth];
        let mut level_earnings = vec![0u64; depth];
        let mut total_referrals = 0u64;
        let mut total_active_referrals = 0u64;
        let mut total_payout = 0u64;
        let mut conversion_sum = Decimal::ZERO;

        for entry in entries {
            let earnings = &entry.earnings;
            for tier in &earnings.tiers {
                let Some(i) = (tier.level as usize).checked_sub(1).filter(|i| *i < depth) else {
                    continue;
                };
                level_counts[i] = level_counts[i].saturating_add(tier.count);
                level_earnings[i] = level_earnings[i]
                    .checked_add(tier.earnings)
                    .ok_or(ReferralError::EarningsOverflow { level: tier.level })?;
            }
            total_payout = total_payout.checked_add(earnings.total_earnings).ok_or_else(|| {
                ReferralError::AggregationFailed {
                    user_id: earnings.user_id.to_string(),
                    reason: "platform payout overflow".to_string(),
                }
            })?;
            total_referrals = total_referrals.saturating_add(earnings.total_referrals);
            total_active_referrals = total_active_referrals.saturating_add(earnings.active_referrals);
            conversion_sum += earnings.conversion_rate();
        }

        let referrers = entries.len() as u64;
        let (average_earnings, average_conversion_rate) = if referrers == 0 {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            let n = Decimal::from(referrers);
            (
                (Decimal::from(total_payout) / n).round_dp(2),
                (conversion_sum / n).round_dp(2),
            )
        };

        Ok(PlatformStats {
            total_referrers: referrers,
            total_referrals,
            total_active_referrals,
            level_counts,
            level_earnings,
            total_payout,
            average_earnings,
            average_conversion_rate,
            computed_at: now,
        })
    }

    fn row(&self, index: usize, entry: &ReferrerEntry) -> ReferrerRow {
        let conversion_rate = entry.earnings.conversion_rate();
        ReferrerRow {
            rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
            profile: ProfileSummary::from(&entry.user),
            activity_score: self
                .weights
                .score(conversion_rate, entry.earnings.total_referrals),
            conversion_rate,
            earnings: entry.earnings.clone(),
        }
    }
}

/// Descending by the sort key, then by total earnings, then ascending id
fn compare(a: &ReferrerEntry, b: &ReferrerEntry, key: SortKey) -> Ordering {
    let (x, y) = (&a.earnings, &b.earnings);
    let primary = match key {
        SortKey::TotalEarnings => y.total_earnings.cmp(&x.total_earnings),
        SortKey::ReferralCount => y.total_referrals.cmp(&x.total_referrals),
        SortKey::ActiveReferrals => y.active_referrals.cmp(&x.active_referrals),
        SortKey::ConversionRate => y.conversion_rate().cmp(&x.conversion_rate()),
    };
    primary
        .then_with(|| y.total_earnings.cmp(&x.total_earnings))
        .then_with(|| a.user.id.cmp(&b.user.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::CommissionCalculator;
    use crate::types::{TimeRange, UserId};
    use chrono::Duration;

    fn entry(id: &str, name: &str, counts: &[u64], total_referrals: u64, age_days: i64) -> ReferrerEntry {
        let breakdown = CommissionCalculator::rwf_default().calculate(counts).unwrap();
        ReferrerEntry {
            user: UserRecord::new(id, name, format!("{}@example.com", id))
                .with_active(true)
                .with_created_at(Utc::now() - Duration::days(age_days)),
            earnings: ReferralEarnings::new(UserId::new(id), breakdown, total_referrals),
        }
    }

    fn sample() -> Vec<ReferrerEntry> {
        vec![
            entry("alice", "Alice Uwase", &[2, 1, 0], 4, 3),
            entry("bob", "Bob Mugisha", &[5, 0, 0], 5, 40),
            entry("carol", "Carol Ineza", &[1, 3, 2], 1, 200),
            entry("dave", "Dave Habimana", &[0, 0, 0], 2, 1),
        ]
    }

    fn builder() -> ListingBuilder {
        ListingBuilder::new(ActivityScoreWeights::default(), 3, 3)
    }

    fn ids(rows: &[ReferrerRow]) -> Vec<&str> {
        rows.iter().map(|r| r.profile.user_id.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_total_earnings() {
        let listing = builder()
            .build(sample(), &ListingQuery::new(1, 10), Utc::now())
            .unwrap();

        // bob 20000, carol 10300, alice 9500, dave 0
        assert_eq!(ids(&listing.rows), vec!["bob", "carol", "alice", "dave"]);
        assert_eq!(listing.rows[0].rank, 1);
        assert_eq!(listing.rows[3].rank, 4);
        assert_eq!(ids(&listing.top_performers), vec!["bob", "carol", "alice"]);
    }

    #[test]
    fn test_platform_stats() {
        let stats = builder().platform_stats(&sample(), Utc::now()).unwrap();

        assert_eq!(stats.total_referrers, 4);
        assert_eq!(stats.total_referrals, 12);
        assert_eq!(stats.total_active_referrals, 8);
        assert_eq!(stats.level_counts, vec![8, 4, 2]);
        assert_eq!(stats.level_earnings, vec![32_000, 6_000, 1_800]);
        assert_eq!(stats.total_payout, 39_800);
        assert_eq!(stats.average_earnings, Decimal::from(9_950));
        // (50 + 100 + 100 + 0) / 4
        assert_eq!(stats.average_conversion_rate, Decimal::new(6250, 2));
    }

    #[test]
    fn test_filters_only_apply_to_rows() {
        let query = ListingQuery::new(1, 10)
            .with_search("uwase")
            .with_time_range(TimeRange::Last7Days);
        let listing = builder().build(sample(), &query, Utc::now()).unwrap();

        assert_eq!(ids(&listing.rows), vec!["alice"]);
        assert_eq!(listing.pagination.total_items, 1);
        assert_eq!(listing.platform_stats.total_referrers, 4);
        assert_eq!(listing.top_performers.len(), 3);
    }

    #[test]
    fn test_time_range_filter() {
        let query = ListingQuery::new(1, 10).with_time_range(TimeRange::Last90Days);
        let listing = builder().build(sample(), &query, Utc::now()).unwrap();
        assert_eq!(ids(&listing.rows), vec!["bob", "alice", "dave"]);
    }

    #[test]
    fn test_alternate_sort_keys() {
        let by_count = ListingQuery::new(1, 10).with_sort(SortKey::ReferralCount);
        let listing = builder().build(sample(), &by_count, Utc::now()).unwrap();
        assert_eq!(ids(&listing.rows), vec!["bob", "alice", "dave", "carol"]);

        // carol and bob both 100%; bob earns more
        let by_rate = ListingQuery::new(1, 10).with_sort(SortKey::ConversionRate);
        let listing = builder().build(sample(), &by_rate, Utc::now()).unwrap();
        assert_eq!(ids(&listing.rows), vec!["bob", "carol", "alice", "dave"]);
    }

    #[test]
    fn test_pagination_ranks_continue() {
        let listing = builder()
            .build(sample(), &ListingQuery::new(2, 3), Utc::now())
            .unwrap();

        assert_eq!(ids(&listing.rows), vec!["dave"]);
        assert_eq!(listing.rows[0].rank, 4);
        assert_eq!(listing.pagination.total_pages, 2);
        assert!(!listing.pagination.has_next);
        assert!(listing.pagination.has_prev);
    }

    #[test]
    fn test_row_scores() {
        let listing = builder()
            .build(sample(), &ListingQuery::new(1, 10), Utc::now())
            .unwrap();
        let alice = listing.rows.iter().find(|r| r.profile.user_id.as_str() == "alice").unwrap();

        assert_eq!(alice.conversion_rate, Decimal::from(50));
        // 50 * 0.6 + 4 * 2
        assert_eq!(alice.activity_score, Decimal::from(38));
    }

    #[test]
    fn test_empty_platform() {
        let listing = builder()
            .build(Vec::new(), &ListingQuery::new(1, 10), Utc::now())
            .unwrap();

        assert!(listing.rows.is_empty());
        assert!(listing.top_performers.is_empty());
        assert_eq!(listing.platform_stats.average_earnings, Decimal::ZERO);
        assert_eq!(listing.pagination.total_pages, 0);
    }
}
