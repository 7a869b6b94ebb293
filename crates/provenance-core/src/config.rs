//! Configuration management for the provenance-scan system.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Tunables for the analysis engine. Defaults match the documented
/// detection thresholds; the funding-source allowlist is always
/// supplied externally, never hardcoded.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Known legitimate funding sources (exchanges, custodians),
    /// lowercased. Wallets funded from these are never clustered by
    /// funding source.
    pub exchange_allowlist: HashSet<String>,
    /// Days of inactivity before a wallet counts as dormant.
    pub dormancy_days: i64,
    /// Maximum first-seen gap for a sybil behavioral-similarity pair.
    pub sybil_window_days: i64,
    /// Behavioral similarity above which a pair is clustered.
    pub sybil_similarity_threshold: f64,
    /// Minimum wallets sharing a funding source to form a cluster.
    pub min_shared_funding_wallets: usize,
    /// Hop cap for the circular-trading search.
    pub max_ring_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exchange_allowlist: HashSet::new(),
            dormancy_days: 180,
            sybil_window_days: 7,
            sybil_similarity_threshold: 0.8,
            min_shared_funding_wallets: 3,
            max_ring_depth: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn with_allowlist<I, S>(allowlist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exchange_allowlist: allowlist
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            ..Self::default()
        }
    }

    pub fn is_allowlisted(&self, address: &str) -> bool {
        self.exchange_allowlist.contains(&address.to_lowercase())
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| Error::Config {
                    message: "DATABASE_URL environment variable not set".to_string(),
                })?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            analysis: AnalysisConfig::from_env(),
        })
    }
}

impl AnalysisConfig {
    /// Load analysis tunables from the environment; every knob has a
    /// default, so this never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            exchange_allowlist: env::var("EXCHANGE_ALLOWLIST")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            dormancy_days: env_or("DORMANCY_DAYS", 180),
            sybil_window_days: env_or("SYBIL_WINDOW_DAYS", 7),
            sybil_similarity_threshold: env_or("SYBIL_SIMILARITY_THRESHOLD", 0.8),
            min_shared_funding_wallets: env_or("MIN_SHARED_FUNDING_WALLETS", 3),
            max_ring_depth: env_or("MAX_RING_DEPTH", 10),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dormancy_days, 180);
        assert_eq!(config.sybil_window_days, 7);
        assert_eq!(config.min_shared_funding_wallets, 3);
        assert_eq!(config.max_ring_depth, 10);
        assert!((config.sybil_similarity_threshold - 0.8).abs() < f64::EPSILON);
        assert!(config.exchange_allowlist.is_empty());
    }

    #[test]
    fn test_allowlist_is_case_insensitive() {
        let config = AnalysisConfig::with_allowlist(["0xAbCd", "0xEXCHANGE"]);
        assert!(config.is_allowlisted("0xabcd"));
        assert!(config.is_allowlisted("0xExchange"));
        assert!(!config.is_allowlisted("0xother"));
    }
}
