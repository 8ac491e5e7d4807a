//! Snapshot Writer
//!
//! Persists [`EarningsSnapshot`] rows. A failed write never fails the caller:
//! the live value is still returned, flagged as not persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ReferralResult;
use crate::storage::SnapshotStore;
use crate::types::{
    EarningsSnapshot, PageRequest, Pagination, ReferralEarnings, SnapshotRefresh, UserId,
};

/// One page of cached snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPage {
    pub snapshots: Vec<EarningsSnapshot>,
    pub pagination: Pagination,
    /// Rows dropped for failing the consistency check
    pub skipped_inconsistent: u64,
}

/// Snapshot writer and reader
pub struct SnapshotWriter<S: SnapshotStore + ?Sized> {
    store: Arc<S>,
    max_age: Option<Duration>,
    // levels a servable row must carry; rows from another rate schedule are stale
    depth: Option<u32>,
}

impl<S: SnapshotStore + ?Sized> Clone for SnapshotWriter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_age: self.max_age,
            depth: self.depth,
        }
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotWriter<S> {
    /// Create writer over a store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_age: None,
            depth: None,
        }
    }

    /// Only serve snapshots younger than `max_age`
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Only serve snapshots with exactly `depth` levels
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Overwrite the user's snapshot with a live computation
    pub async fn write(&self, earnings: &ReferralEarnings, now: DateTime<Utc>) -> SnapshotRefresh {
        let snapshot = EarningsSnapshot::from_earnings(earnings, now);

        match self.store.upsert_snapshot(&snapshot).await {
            Ok(()) => {
                info!(
                    user_id = %snapshot.user_id,
                    total_earnings = snapshot.total_earnings,
                    "Snapshot written"
                );
                SnapshotRefresh {
                    snapshot,
                    persisted: true,
                }
            }
            Err(e) => {
                warn!(
                    user_id = %snapshot.user_id,
                    error = %e,
                    "Snapshot write failed, returning computed value"
                );
                SnapshotRefresh {
                    snapshot,
                    persisted: false,
                }
            }
        }
    }

    /// Cached snapshot if it can be served as-is.
    ///
    /// Returns `None` when the row is missing, inactive, stale or
    /// inconsistent, or when the read itself fails.
    pub async fn read_servable(&self, user_id: &UserId, now: DateTime<Utc>) -> Option<EarningsSnapshot> {
        let snapshot = match self.store.get_snapshot(user_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(user_id = %user_id, "Snapshot miss");
                return None;
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Snapshot read failed, treating as miss");
                return None;
            }
        };

        if let Err(e) = snapshot.verify_invariant() {
            warn!(user_id = %user_id, error = %e, "Inconsistent snapshot, recomputing");
            return None;
        }
        if !snapshot.is_active {
            debug!(user_id = %user_id, "Snapshot deactivated, recomputing");
            return None;
        }
        if let Some(depth) = self.depth {
            if snapshot.levels.len() != depth as usize {
                debug!(
                    user_id = %user_id,
                    levels = snapshot.levels.len(),
                    depth,
                    "Snapshot from another rate schedule, recomputing"
                );
                return None;
            }
        }
        if !snapshot.is_fresh(self.max_age, now) {
            debug!(
                user_id = %user_id,
                last_calculated = %snapshot.last_calculated,
                "Snapshot stale, recomputing"
            );
            return None;
        }

        Some(snapshot)
    }

    /// Active, consistent snapshots by total earnings, highest first.
    ///
    /// `page` must already be normalized.
    pub async fn list(&self, page: PageRequest) -> ReferralResult<SnapshotPage> {
        let rows = self.store.list_snapshots(true).await?;

        let mut skipped = 0u64;
        let mut valid: Vec<EarningsSnapshot> = rows
            .into_iter()
            .filter(|s| match s.verify_invariant() {
                Ok(()) => true,
                Err(e) => {
                    warn!(user_id = %s.user_id, error = %e, "Skipping inconsistent snapshot");
                    skipped += 1;
                    false
                }
            })
            .collect();

        valid.sort_by(|a, b| {
            b.total_earnings
                .cmp(&a.total_earnings)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let pagination = Pagination::new(page, valid.len() as u64);
        let snapshots = pagination.slice(&valid).to_vec();

        Ok(SnapshotPage {
            snapshots,
            pagination,
            skipped_inconsistent: skipped,
        })
    }
}
