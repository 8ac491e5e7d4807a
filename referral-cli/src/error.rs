//! CLI Error Types
//!
//! Error types for the referral CLI application.

use referral_core::ReferralError;
use referral_store::StoreError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// User not found
    #[error("User not found: {id}")]
    NotFound { id: String },

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Engine error
    #[error("Engine error: {0}")]
    EngineError(#[from] ReferralError),

    /// Store error
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CliError::ConfigError {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        CliError::NotFound { id: id.into() }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError { .. } => 1,
            CliError::InvalidArgument { .. } => 2,
            CliError::IoError(_) => 5,
            CliError::JsonError(_) => 6,
            CliError::EngineError(e) if e.is_infrastructure() => 13,
            CliError::EngineError(_) => 12,
            CliError::StoreError(_) => 31,
            CliError::NotFound { .. } => 21,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("Missing database path");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Missing database path"));
    }

    #[test]
    fn test_invalid_argument() {
        let err = CliError::invalid_arg("page must be at least 1");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_engine_error_codes() {
        let err = CliError::from(ReferralError::InvalidPagination {
            reason: "page numbers start at 1".to_string(),
        });
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("REF-LIST-002"));

        let err = CliError::from(ReferralError::DirectoryUnavailable("down".to_string()));
        assert_eq!(err.exit_code(), 13);
    }
}
