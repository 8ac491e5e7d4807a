//! Engine Configuration
//!
//! Rate schedule, aggregation limits and paging defaults.
//! Supports loading from environment variables with REFERRAL_ prefix.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::commission::CommissionRates;
use crate::error::{ReferralError, ReferralResult};
use crate::leaderboard::ActivityScoreWeights;

/// Referral engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// RWF per active referral, index 0 = level 1
    #[serde(default)]
    pub rates: CommissionRates,
    /// Referrers computed concurrently during aggregation
    #[serde(default = "default_aggregation_concurrency")]
    pub aggregation_concurrency: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Hall-of-fame size
    #[serde(default = "default_top_performers")]
    pub top_performers: usize,
    /// Oldest snapshot served by cache-aside reads; `None` serves any age
    #[serde(default)]
    pub snapshot_max_age_secs: Option<u64>,
    #[serde(default)]
    pub activity: ActivityScoreWeights,
}

fn default_aggregation_concurrency() -> usize {
    8
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_top_performers() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rates: CommissionRates::default(),
            aggregation_concurrency: default_aggregation_concurrency(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            top_performers: default_top_performers(),
            snapshot_max_age_secs: None,
            activity: ActivityScoreWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - REFERRAL_TIER_RATES: comma-separated RWF rates (e.g. "4000,1500,900")
    /// - REFERRAL_AGGREGATION_CONCURRENCY: referrers computed in parallel
    /// - REFERRAL_DEFAULT_PAGE_SIZE: page size when none is requested
    /// - REFERRAL_MAX_PAGE_SIZE: upper bound on requested page sizes
    /// - REFERRAL_TOP_PERFORMERS: hall-of-fame size
    /// - REFERRAL_SNAPSHOT_MAX_AGE_SECS: snapshot freshness bound (optional)
    ///
    /// Unset variables keep their defaults; malformed ones are errors.
    pub fn from_env() -> ReferralResult<Self> {
        let defaults = Self::default();

        let rates = match env::var("REFERRAL_TIER_RATES") {
            Ok(s) => CommissionRates::parse(&s)?,
            Err(_) => defaults.rates,
        };

        let config = Self {
            rates,
            aggregation_concurrency: env_or(
                "REFERRAL_AGGREGATION_CONCURRENCY",
                defaults.aggregation_concurrency,
            )?,
            default_page_size: env_or("REFERRAL_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: env_or("REFERRAL_MAX_PAGE_SIZE", defaults.max_page_size)?,
            top_performers: env_or("REFERRAL_TOP_PERFORMERS", defaults.top_performers)?,
            snapshot_max_age_secs: match env::var("REFERRAL_SNAPSHOT_MAX_AGE_SECS") {
                Ok(s) => Some(parse_var("REFERRAL_SNAPSHOT_MAX_AGE_SECS", &s)?),
                Err(_) => None,
            },
            activity: defaults.activity,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create a configuration for local development
    pub fn development() -> Self {
        Self {
            aggregation_concurrency: 4,
            default_page_size: 10,
            ..Self::default()
        }
    }

    /// Create a configuration for tests: serial aggregation, small pages
    pub fn test() -> Self {
        Self {
            aggregation_concurrency: 1,
            default_page_size: 5,
            max_page_size: 50,
            ..Self::default()
        }
    }

    pub fn with_rates(mut self, rates: CommissionRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_snapshot_max_age(mut self, secs: u64) -> Self {
        self.snapshot_max_age_secs = Some(secs);
        self
    }

    /// Tiers walked by the resolver
    pub fn max_depth(&self) -> u32 {
        self.rates.max_depth()
    }

    /// Freshness bound for cache-aside reads.
    ///
    /// Bounds beyond what `chrono` can represent saturate to `Duration::MAX`;
    /// `validate()` rejects them.
    pub fn snapshot_max_age(&self) -> Option<chrono::Duration> {
        self.snapshot_max_age_secs
            .map(|secs| max_age_from_secs(secs).unwrap_or(chrono::Duration::MAX))
    }

    /// Validate configuration
    pub fn validate(&self) -> ReferralResult<()> {
        if self.rates.max_depth() == 0 {
            return Err(ReferralError::Configuration(
                "rate schedule must define at least one tier".to_string(),
            ));
        }
        if self.aggregation_concurrency == 0 {
            return Err(ReferralError::Configuration(
                "aggregation_concurrency must be at least 1".to_string(),
            ));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(ReferralError::Configuration(
                "page sizes must be at least 1".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ReferralError::Configuration(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if let Some(secs) = self.snapshot_max_age_secs {
            if max_age_from_secs(secs).is_none() {
                return Err(ReferralError::Configuration(format!(
                    "snapshot_max_age_secs {} is out of range",
                    secs
                )));
            }
        }
        self.activity.validate()
    }
}

fn max_age_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

fn env_or<T: FromStr>(key: &str, default: T) -> ReferralResult<T> {
    match env::var(key) {
        Ok(s) => parse_var(key, &s),
        Err(_) => Ok(default),
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> ReferralResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ReferralError::Configuration(format!("invalid {}: '{}'", key, value)))
}
