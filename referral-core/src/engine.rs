//! Referral Engine
//!
//! Facade over the resolver, calculator, snapshot writer, leaderboard and
//! team view. Reads the directory only; the snapshot store is its one write
//! target.

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::commission::CommissionCalculator;
use crate::config::EngineConfig;
use crate::error::{ReferralError, ReferralResult};
use crate::leaderboard::{ListingBuilder, ReferrerEntry};
use crate::snapshot::{SnapshotPage, SnapshotWriter};
use crate::storage::{SnapshotStore, UserDirectory};
use crate::team::TreeBuilder;
use crate::tiers::TierResolver;
use crate::types::{
    CacheSource, CachedEarnings, ListingQuery, PageRequest, ReferralEarnings, ReferralTree,
    ReferrerListing, SnapshotRefresh, UserId, UserRecord,
};

/// Referral earnings engine
pub struct ReferralEngine<D: UserDirectory + 'static, S: SnapshotStore + 'static> {
    config: EngineConfig,
    directory: Arc<D>,
    snapshots: SnapshotWriter<S>,
    resolver: TierResolver,
    calculator: CommissionCalculator,
    trees: TreeBuilder,
    listing: ListingBuilder,
}

impl<D: UserDirectory + 'static, S: SnapshotStore + 'static> ReferralEngine<D, S> {
    /// Create engine from validated parts
    pub fn new(config: EngineConfig, directory: Arc<D>, snapshots: Arc<S>) -> ReferralResult<Self> {
        config.validate()?;

        let calculator = CommissionCalculator::new(config.rates.clone());
        let resolver = TierResolver::new(config.max_depth());
        let trees = TreeBuilder::new(calculator.clone());
        let listing = ListingBuilder::new(
            config.activity.clone(),
            config.top_performers,
            config.max_depth(),
        );
        let snapshots = SnapshotWriter::new(snapshots)
            .with_max_age(config.snapshot_max_age())
            .with_depth(config.max_depth());

        Ok(Self {
            config,
            directory,
            snapshots,
            resolver,
            calculator,
            trees,
            listing,
        })
    }

    /// Start a builder
    pub fn builder() -> ReferralEngineBuilder<D, S> {
        ReferralEngineBuilder::new()
    }

    /// Live multilevel earnings. Unknown users earn zero.
    pub async fn compute_earnings(&self, user_id: &UserId) -> ReferralResult<ReferralEarnings> {
        let sets = self.resolver.resolve(self.directory.as_ref(), user_id).await?;
        let breakdown = self.calculator.calculate(&sets.counts())?;
        let total_referrals = self
            .directory
            .find_direct_referrals(user_id)
            .await?
            .len() as u64;

        let earnings = ReferralEarnings::new(user_id.clone(), breakdown, total_referrals);
        debug!(
            user_id = %user_id,
            total_earnings = earnings.total_earnings,
            total_referrals = earnings.total_referrals,
            active_referrals = earnings.active_referrals,
            "Earnings computed"
        );
        Ok(earnings)
    }

    /// Recompute and overwrite the user's snapshot.
    ///
    /// Only a failed computation is an error; a failed write is reported via
    /// `persisted`.
    pub async fn refresh_snapshot(&self, user_id: &UserId) -> ReferralResult<SnapshotRefresh> {
        let earnings = self.compute_earnings(user_id).await?;
        Ok(self.snapshots.write(&earnings, Utc::now()).await)
    }

    /// Serve a trusted snapshot, or refresh it
    pub async fn cached_earnings(&self, user_id: &UserId) -> ReferralResult<CachedEarnings> {
        if let Some(snapshot) = self.snapshots.read_servable(user_id, Utc::now()).await {
            debug!(user_id = %user_id, "Serving cached snapshot");
            return Ok(CachedEarnings {
                snapshot,
                source: CacheSource::Snapshot,
                persisted: true,
            });
        }

        let refresh = self.refresh_snapshot(user_id).await?;
        Ok(CachedEarnings {
            snapshot: refresh.snapshot,
            source: CacheSource::Recomputed,
            persisted: refresh.persisted,
        })
    }

    /// Active, consistent snapshots by total earnings
    pub async fn list_snapshots(&self, page: PageRequest) -> ReferralResult<SnapshotPage> {
        let page = self.normalize(page)?;
        self.snapshots.list(page).await
    }

    /// Leaderboard page with hall of fame and platform stats.
    ///
    /// Every referrer is computed live; any failure fails the whole request.
    pub async fn list_referrers(&self, query: ListingQuery) -> ReferralResult<ReferrerListing> {
        let query = ListingQuery {
            page: self.normalize(query.page)?,
            ..query
        };

        let referrers = self.directory.find_referrers().await?;
        let candidates = referrers.len();

        let entries: Vec<ReferrerEntry> = stream::iter(referrers)
            .map(|user| self.referrer_entry(user))
            .buffer_unordered(self.config.aggregation_concurrency)
            .try_collect()
            .await?;

        let listing = self.listing.build(entries, &query, Utc::now())?;
        info!(
            referrers = candidates,
            matched = listing.pagination.total_items,
            page = listing.pagination.page,
            total_payout = listing.platform_stats.total_payout,
            "Referrer listing built"
        );
        Ok(listing)
    }

    /// Labeled team tree for a user
    pub async fn get_user_referral_tree(&self, user_id: &UserId) -> ReferralResult<ReferralTree> {
        let tree = self.trees.build(self.directory.as_ref(), user_id).await?;
        debug!(
            user_id = %user_id,
            members = tree.stats.total_members,
            total_earnings = tree.stats.total_earnings,
            "Team tree built"
        );
        Ok(tree)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    pub fn snapshot_store(&self) -> &Arc<S> {
        self.snapshots.store()
    }

    async fn referrer_entry(&self, user: UserRecord) -> ReferralResult<ReferrerEntry> {
        let earnings = self.compute_earnings(&user.id).await.map_err(|e| {
            ReferralError::AggregationFailed {
                user_id: user.id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(ReferrerEntry { user, earnings })
    }

    fn normalize(&self, page: PageRequest) -> ReferralResult<PageRequest> {
        page.normalize(self.config.default_page_size, self.config.max_page_size)
    }
}

/// Referral engine builder
pub struct ReferralEngineBuilder<D: UserDirectory + 'static, S: SnapshotStore + 'static> {
    config: Option<EngineConfig>,
    directory: Option<Arc<D>>,
    snapshots: Option<Arc<S>>,
}

impl<D: UserDirectory + 'static, S: SnapshotStore + 'static> Default for ReferralEngineBuilder<D, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: UserDirectory + 'static, S: SnapshotStore + 'static> ReferralEngineBuilder<D, S> {
    pub fn new() -> Self {
        Self {
            config: None,
            directory: None,
            snapshots: None,
        }
    }

    /// Set configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set user directory
    pub fn directory(mut self, directory: Arc<D>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Set snapshot store
    pub fn snapshots(mut self, snapshots: Arc<S>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Build the engine
    pub fn build(self) -> ReferralResult<ReferralEngine<D, S>> {
        let config = self.config.unwrap_or_default();
        let directory = self
            .directory
            .ok_or_else(|| ReferralError::Configuration("user directory is required".to_string()))?;
        let snapshots = self
            .snapshots
            .ok_or_else(|| ReferralError::Configuration("snapshot store is required".to_string()))?;

        ReferralEngine::new(config, directory, snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_builder_requires_parts() {
        let result = ReferralEngine::<MemoryStore, MemoryStore>::builder()
            .config(EngineConfig::test())
            .build();
        assert!(matches!(result, Err(ReferralError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let store = Arc::new(MemoryStore::new());
        let mut config = EngineConfig::test();
        config.max_page_size = 0;

        let result = ReferralEngine::builder()
            .config(config)
            .directory(store.clone())
            .snapshots(store)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_unrepresentable_max_age() {
        let store = Arc::new(MemoryStore::new());
        let result = ReferralEngine::builder()
            .config(EngineConfig::default().with_snapshot_max_age(10_000_000_000_000_000))
            .directory(store.clone())
            .snapshots(store)
            .build();
        assert!(matches!(result, Err(ReferralError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_page_zero_rejected() {
        let store = Arc::new(MemoryStore::new());
        let engine = ReferralEngine::builder()
            .directory(store.clone())
            .snapshots(store)
            .build()
            .unwrap();

        let err = engine
            .list_referrers(ListingQuery::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ReferralError::InvalidPagination { .. }));

        let err = engine.list_snapshots(PageRequest::new(0, 10)).await.unwrap_err();
        assert!(matches!(err, ReferralError::InvalidPagination { .. }));
    }
}
