//! Referral Store Error Types

use referral_core::ReferralError;
use thiserror::Error;

/// Store Result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// Key cannot be stored
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Domain rule rejected the write
    #[error(transparent)]
    Rejected(#[from] ReferralError),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a database error with context
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Database(format!("{}: {}", context, err))
    }

    /// Convert for a failed directory read
    pub fn into_directory(self, operation: &str) -> ReferralError {
        match self {
            Self::Rejected(e) => e,
            other => ReferralError::directory(operation, other.to_string()),
        }
    }

    /// Convert for a failed snapshot operation
    pub fn into_snapshot(self, operation: &str) -> ReferralError {
        match self {
            Self::Rejected(e) => e,
            other => ReferralError::snapshot(operation, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<StoreError> for ReferralError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => e,
            StoreError::NotFound { entity_type, id } => ReferralError::not_found(entity_type, id),
            StoreError::Serialization(msg) => ReferralError::Serialization(msg),
            other => ReferralError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_conversion() {
        let err = StoreError::Database("io".to_string()).into_directory("find_by_id");
        assert!(matches!(err, ReferralError::Directory { .. }));
        assert!(err.to_string().starts_with("[REF-DIR-001]"));

        let err = StoreError::Database("io".to_string()).into_snapshot("upsert");
        assert!(matches!(err, ReferralError::Snapshot { .. }));
    }

    #[test]
    fn test_rejection_passes_through() {
        let rejected = StoreError::from(ReferralError::DuplicateUser {
            user_id: "u1".to_string(),
        });
        assert_eq!(
            ReferralError::from(rejected),
            ReferralError::DuplicateUser {
                user_id: "u1".to_string()
            }
        );
    }
}
