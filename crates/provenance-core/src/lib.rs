//! Core types, configuration, provider traits, and persistence for
//! collector-network authenticity analysis.

pub mod config;
pub mod db;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{AnalysisConfig, Config, DatabaseConfig};
pub use error::{Error, Result};
pub use provider::{FundingTotal, InMemoryTransferHistory, TransferHistory};
pub use types::{
    ActivityPattern, CircularRing, ClusterEvidence, ComponentScores, Finding, FindingKind,
    FindingSeverity, IdentitySignals, NetworkAnalysis, SuspicionFlag, SuspicionLevel, SybilCluster,
    TransferRecord, WalletProfile, NULL_ADDRESS,
};
