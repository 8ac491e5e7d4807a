//! Storage Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sled storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory
    pub data_dir: PathBuf,
    /// Page cache size in bytes
    pub cache_size: u64,
    /// Background flush interval; `None` flushes only on request
    pub flush_every_ms: Option<u64>,
    /// Delete the database when dropped
    pub temporary: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./referral_data"),
            cache_size: 64 * 1024 * 1024, // 64MB
            flush_every_ms: Some(500),
            temporary: false,
        }
    }
}

impl StorageConfig {
    /// Create configuration at a path
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Create development configuration
    pub fn development() -> Self {
        Self {
            data_dir: PathBuf::from("./referral_dev_data"),
            cache_size: 16 * 1024 * 1024, // 16MB
            flush_every_ms: Some(1000),
            temporary: false,
        }
    }

    /// Create test configuration (temporary database)
    pub fn test() -> Self {
        Self {
            data_dir: PathBuf::new(),
            cache_size: 4 * 1024 * 1024, // 4MB
            flush_every_ms: None,
            temporary: true,
        }
    }

    pub(crate) fn to_sled(&self) -> sled::Config {
        let config = sled::Config::new()
            .cache_capacity(self.cache_size)
            .flush_every_ms(self.flush_every_ms)
            .temporary(self.temporary);

        if self.temporary && self.data_dir.as_os_str().is_empty() {
            config
        } else {
            config.path(&self.data_dir)
        }
    }
}
