//! Data model for collector-network analysis runs.
//!
//! A run consumes read-only [`TransferRecord`]s resolved for one creator,
//! produces one [`WalletProfile`] per collector plus transient detection
//! artifacts ([`SybilCluster`], [`CircularRing`]), and emits a single
//! immutable [`NetworkAnalysis`] record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Sentinel address used for mints and burns. Never treated as a wallet.
pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A single on-chain transfer of a creator's work. Read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Token identifier within the creator's catalog.
    pub token_id: String,
    /// Address of the creator of the transferred work.
    pub artist: String,
    pub from: String,
    pub to: String,
    /// Number of editions moved (1 for unique pieces).
    pub amount: u64,
    /// Sale value in currency units; zero for free transfers.
    pub value: Decimal,
    /// Block timestamp. Absent when the upstream indexer could not
    /// resolve it; time-based factors then degrade to neutral.
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransferRecord {
    pub fn is_mint(&self) -> bool {
        self.from == NULL_ADDRESS
    }

    pub fn is_burn(&self) -> bool {
        self.to == NULL_ADDRESS
    }

    /// True for wallet-to-wallet transfers (neither mint nor burn).
    pub fn is_secondary(&self) -> bool {
        !self.is_mint() && !self.is_burn()
    }
}

/// Behavioral red flags attached to a wallet profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionFlag {
    SingleArtistCollector,
    VeryShortHoldTimes,
    FrequentImmediateFlips,
    DormantWallet,
    MinimalActivity,
    NoExternalNftActivity,
}

/// Behavioral profile of one collector address.
///
/// Computed fresh for every analysis run from the wallet's full
/// cross-creator transfer history; never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletProfile {
    pub address: String,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
    /// Transfers touching this wallet as sender or receiver, any creator.
    pub total_transactions: u64,
    /// Distinct creators among inbound transfers.
    pub unique_artists_collected: u64,
    /// Whether the wallet ever touched a work by another creator.
    pub nft_activity_outside_artist: bool,
    /// Fraction of received pieces that are the target creator's, in [0, 1].
    pub single_artist_ratio: f64,
    /// Mean acquire-to-dispose time over matched pairs, in days. 0 = no pairs.
    pub avg_hold_time_days: f64,
    /// Acquire-to-dispose pairs completed within 24 hours.
    pub immediate_flip_count: u64,
    /// Heuristic liveness estimate in [0, 100].
    pub vitality_score: f64,
    pub suspicion_flags: BTreeSet<SuspicionFlag>,
}

/// Verified-identity hints from the (external) identity resolver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdentitySignals {
    /// Wallet has a verified on-chain name (ENS or equivalent).
    pub has_verified_name: bool,
    /// Wallet is linked to a social account.
    pub has_social_link: bool,
}

impl IdentitySignals {
    pub fn signal_count(&self) -> u32 {
        self.has_verified_name as u32 + self.has_social_link as u32
    }
}

/// Why a group of wallets was clustered together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterEvidence {
    /// All members received most of their funding from one
    /// non-exchange address.
    SharedFundingSource { source: String },
    /// Members were created close together and behave near-identically.
    BehavioralSimilarity,
}

/// Set of addresses believed to share a single controlling entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SybilCluster {
    pub members: BTreeSet<String>,
    pub evidence: ClusterEvidence,
}

impl SybilCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Ordered transfer cycle of at least three addresses returning to its start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircularRing {
    pub path: Vec<String>,
}

impl CircularRing {
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Temporal shape of the creator's transfer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPattern {
    Organic,
    Growing,
    Declining,
    BurstSilence,
    LimitedData,
    NoData,
}

impl ActivityPattern {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActivityPattern::Organic => "organic",
            ActivityPattern::Growing => "growing",
            ActivityPattern::Declining => "declining",
            ActivityPattern::BurstSilence => "burst_silence",
            ActivityPattern::LimitedData => "limited_data",
            ActivityPattern::NoData => "no_data",
        }
    }
}

/// Final verdict tier for a network analysis.
///
/// Ordering is defined by [`SuspicionLevel::ordinal`] rather than
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionLevel {
    Clean,
    Minor,
    Moderate,
    High,
    Severe,
}

impl SuspicionLevel {
    /// Explicit ordinal: CLEAN(0) < MINOR(1) < MODERATE(2) < HIGH(3) < SEVERE(4).
    pub const fn ordinal(&self) -> u8 {
        match self {
            SuspicionLevel::Clean => 0,
            SuspicionLevel::Minor => 1,
            SuspicionLevel::Moderate => 2,
            SuspicionLevel::High => 3,
            SuspicionLevel::Severe => 4,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SuspicionLevel::Clean => "clean",
            SuspicionLevel::Minor => "minor",
            SuspicionLevel::Moderate => "moderate",
            SuspicionLevel::High => "high",
            SuspicionLevel::Severe => "severe",
        }
    }
}

impl PartialOrd for SuspicionLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SuspicionLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

/// Category of a compiled finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    SybilClusters,
    CircularTrading,
    DeadEndWallets,
    TimelineAnomaly,
    VerifiedCollectors,
}

/// Severity of a compiled finding. `Positive` marks good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Positive,
    Minor,
    Moderate,
    High,
}

/// One human-readable entry in the findings report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: FindingSeverity,
    pub title: String,
    pub description: String,
    pub details: serde_json::Value,
}

/// The four component scores feeding the overall verdict, each in [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentScores {
    pub collector_vitality: f64,
    pub network_authenticity: f64,
    pub transaction_legitimacy: f64,
    pub timeline_health: f64,
}

/// Result of one full analysis run. Persisted append-only; a new run
/// produces a new record rather than mutating an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkAnalysis {
    pub id: Uuid,
    pub artist_address: String,
    pub analyzed_at: DateTime<Utc>,
    pub total_collectors: u64,
    pub sybil_cluster_count: u64,
    pub circular_trading_detected: bool,
    /// Size of the largest detected ring; 0 when none.
    pub circular_ring_size: u64,
    pub dead_end_wallets: u64,
    pub wash_trade_indicators: u64,
    pub self_dealing_volume: Decimal,
    pub legitimate_volume: Decimal,
    pub activity_pattern: ActivityPattern,
    pub scores: ComponentScores,
    /// Fixed convex combination of the component scores
    /// (0.35 / 0.30 / 0.20 / 0.15).
    pub overall_authenticity_score: f64,
    pub suspicion_level: SuspicionLevel,
    pub findings: Vec<Finding>,
}
