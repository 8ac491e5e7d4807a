//! Referral Error Codes Registry
//!
//! Error code format: REF-{module}-{sequence}
//! - REF-DIR: User directory errors
//! - REF-CALC: Commission calculation errors
//! - REF-SNAP: Snapshot cache errors
//! - REF-LIST: Aggregate listing errors
//! - REF-USER: Directory write validation errors
//! - REF-CFG: Configuration errors

use thiserror::Error;

/// Referral Result type
pub type ReferralResult<T> = Result<T, ReferralError>;

/// Referral Error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferralError {
    // ============================================================
    // Directory Errors (REF-DIR-*)
    // ============================================================
    /// [REF-DIR-001] Directory query failed
    #[error("[REF-DIR-001] Directory query {operation} failed: {reason}")]
    Directory { operation: String, reason: String },

    /// [REF-DIR-002] Directory unavailable
    #[error("[REF-DIR-002] Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    // ============================================================
    // Calculation Errors (REF-CALC-*)
    // ============================================================
    /// [REF-CALC-001] Earnings overflow
    #[error("[REF-CALC-001] Earnings overflow at level {level}")]
    EarningsOverflow { level: u32 },

    // ============================================================
    // Snapshot Errors (REF-SNAP-*)
    // ============================================================
    /// [REF-SNAP-001] Snapshot store operation failed
    #[error("[REF-SNAP-001] Snapshot {operation} failed: {reason}")]
    Snapshot { operation: String, reason: String },

    /// [REF-SNAP-002] Stored snapshot is inconsistent
    #[error("[REF-SNAP-002] Snapshot for {user_id} is inconsistent: {details}")]
    SnapshotInconsistent { user_id: String, details: String },

    // ============================================================
    // Listing Errors (REF-LIST-*)
    // ============================================================
    /// [REF-LIST-001] Aggregation aborted
    #[error("[REF-LIST-001] Aggregation aborted at referrer {user_id}: {reason}")]
    AggregationFailed { user_id: String, reason: String },

    /// [REF-LIST-002] Invalid pagination
    #[error("[REF-LIST-002] Invalid pagination: {reason}")]
    InvalidPagination { reason: String },

    /// [REF-LIST-003] Unknown listing option
    #[error("[REF-LIST-003] Unknown {option} value: {value}")]
    UnknownListingOption { option: String, value: String },

    // ============================================================
    // User Write Errors (REF-USER-*)
    // ============================================================
    /// [REF-USER-001] Duplicate user
    #[error("[REF-USER-001] User {user_id} already exists")]
    DuplicateUser { user_id: String },

    /// [REF-USER-002] Self referral
    #[error("[REF-USER-002] User {user_id} cannot refer itself")]
    SelfReferral { user_id: String },

    /// [REF-USER-003] Unknown recruiter
    #[error("[REF-USER-003] Recruiter {referrer_id} of user {user_id} does not exist")]
    UnknownReferrer { user_id: String, referrer_id: String },

    /// [REF-USER-004] Referral cycle
    #[error("[REF-USER-004] Referral cycle detected among {count} users")]
    ReferralCycle { count: usize },

    /// [REF-USER-005] User still has recruits
    #[error("[REF-USER-005] User {user_id} still recruits {recruits} users")]
    HasRecruits { user_id: String, recruits: usize },

    // ============================================================
    // Configuration Errors (REF-CFG-*)
    // ============================================================
    /// [REF-CFG-001] Invalid configuration
    #[error("[REF-CFG-001] Invalid configuration: {0}")]
    Configuration(String),

    // ============================================================
    // General Errors
    // ============================================================
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReferralError {
    /// Create a directory error
    pub fn directory(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Directory {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a snapshot error
    pub fn snapshot(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Snapshot {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable error code, e.g. `REF-DIR-001`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Directory { .. } => "REF-DIR-001",
            Self::DirectoryUnavailable(_) => "REF-DIR-002",
            Self::EarningsOverflow { .. } => "REF-CALC-001",
            Self::Snapshot { .. } => "REF-SNAP-001",
            Self::SnapshotInconsistent { .. } => "REF-SNAP-002",
            Self::AggregationFailed { .. } => "REF-LIST-001",
            Self::InvalidPagination { .. } => "REF-LIST-002",
            Self::UnknownListingOption { .. } => "REF-LIST-003",
            Self::DuplicateUser { .. } => "REF-USER-001",
            Self::SelfReferral { .. } => "REF-USER-002",
            Self::UnknownReferrer { .. } => "REF-USER-003",
            Self::ReferralCycle { .. } => "REF-USER-004",
            Self::HasRecruits { .. } => "REF-USER-005",
            Self::Configuration(_) => "REF-CFG-001",
            Self::NotFound { .. } => "REF-NOT-FOUND",
            Self::Serialization(_) => "REF-SERDE",
            Self::Internal(_) => "REF-INTERNAL",
        }
    }

    /// Whether the failure came from a collaborator rather than the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Directory { .. }
                | Self::DirectoryUnavailable(_)
                | Self::Snapshot { .. }
                | Self::Internal(_)
        )
    }
}

impl From<serde_json::Error> for ReferralError {
    fn from(err: serde_json::Error) -> Self {
        ReferralError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_carries_code() {
        let err = ReferralError::directory("find_children_of", "connection reset");
        assert!(err.to_string().starts_with("[REF-DIR-001]"));
        assert_eq!(err.code(), "REF-DIR-001");
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_overflow_is_not_infrastructure() {
        let err = ReferralError::EarningsOverflow { level: 2 };
        assert_eq!(err.code(), "REF-CALC-001");
        assert!(!err.is_infrastructure());
        assert!(err.to_string().contains("level 2"));
    }

    #[test]
    fn test_has_recruits_code() {
        let err = ReferralError::HasRecruits {
            user_id: "r".to_string(),
            recruits: 2,
        };
        assert_eq!(err.code(), "REF-USER-005");
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: Result<u64, _> = serde_json::from_str("not-a-number");
        let err: ReferralError = parse.unwrap_err().into();
        assert_eq!(err.code(), "REF-SERDE");
    }
}
