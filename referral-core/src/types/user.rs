//! User Directory Records
//!
//! The directory is owned by the surrounding application. The engine only
//! reads `referred_by` and `is_active`; profile fields pass through to
//! listings and team views.

use super::UserId;
use crate::error::{ReferralError, ReferralResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A user as stored in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    /// Recruiter, set once at registration
    #[serde(default)]
    pub referred_by: Option<UserId>,
    /// Activation fee paid
    #[serde(default)]
    pub is_active: bool,
    /// Registration time; imports without one are stamped on load
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create an inactive user without a recruiter
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            email: email.into(),
            mobile: None,
            referred_by: None,
            is_active: false,
            created_at: Utc::now(),
        }
    }

    /// Set recruiter
    pub fn referred_by(mut self, referrer: UserId) -> Self {
        self.referred_by = Some(referrer);
        self
    }

    /// Set active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Set mobile number
    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Set registration time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Case-insensitive substring match on name or email
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }

    /// Reject records that could never be inserted
    pub fn validate(&self) -> ReferralResult<()> {
        if self.referred_by.as_ref() == Some(&self.id) {
            return Err(ReferralError::SelfReferral {
                user_id: self.id.to_string(),
            });
        }
        Ok(())
    }
}

/// Which children a directory lookup returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityFilter {
    All,
    ActiveOnly,
}

impl ActivityFilter {
    pub fn admits(&self, user: &UserRecord) -> bool {
        match self {
            Self::All => true,
            Self::ActiveOnly => user.is_active,
        }
    }
}

/// Profile fields shown next to earnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<&UserRecord> for ProfileSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            is_active: user.is_active,
            joined_at: user.created_at,
        }
    }
}

/// Order a batch so every recruiter precedes its recruits.
///
/// Recruiters may also live in `existing` (already stored). Fails on
/// duplicates, self-referrals, unknown recruiters and cycles.
pub fn order_for_import(
    records: Vec<UserRecord>,
    existing: &HashSet<UserId>,
) -> ReferralResult<Vec<UserRecord>> {
    let mut pending: HashMap<UserId, UserRecord> = HashMap::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if existing.contains(&record.id) || pending.contains_key(&record.id) {
            return Err(ReferralError::DuplicateUser {
                user_id: record.id.to_string(),
            });
        }
        pending.insert(record.id.clone(), record);
    }

    for record in pending.values() {
        if let Some(referrer) = &record.referred_by {
            if !existing.contains(referrer) && !pending.contains_key(referrer) {
                return Err(ReferralError::UnknownReferrer {
                    user_id: record.id.to_string(),
                    referrer_id: referrer.to_string(),
                });
            }
        }
    }

    let mut placed: HashSet<UserId> = existing.clone();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let mut ready: Vec<UserId> = pending
            .values()
            .filter(|r| r.referred_by.as_ref().map_or(true, |p| placed.contains(p)))
            .map(|r| r.id.clone())
            .collect();

        if ready.is_empty() {
            return Err(ReferralError::ReferralCycle {
                count: pending.len(),
            });
        }

        // Stable output for identical input
        ready.sort();
        for id in ready {
            if let Some(record) = pending.remove(&id) {
                placed.insert(id);
                ordered.push(record);
            }
        }
    }

    Ok(ordered)
}
