//! Component score aggregation and the final suspicion verdict.
//!
//! Four component scores (collector vitality, network authenticity,
//! transaction legitimacy, timeline health) combine through a fixed
//! convex weighting into the overall authenticity score; the verdict
//! tier follows from that score and a count of severe red flags.

use crate::timeline::TimelineReport;
use crate::wash_trade::WashTradeReport;
use provenance_core::types::{
    ActivityPattern, CircularRing, ComponentScores, SuspicionLevel, SybilCluster, WalletProfile,
};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// Fixed component weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub vitality: f64,
    pub network: f64,
    pub transaction: f64,
    pub timeline: f64,
}

impl ScoreWeights {
    pub const DEFAULT: Self = Self {
        vitality: 0.35,
        network: 0.30,
        transaction: 0.20,
        timeline: 0.15,
    };
}

/// Mean collector vitality plus a diversity bonus for the share of
/// clearly-healthy wallets. Defaults to 50 with no profiles.
pub fn collector_vitality_score(profiles: &BTreeMap<String, WalletProfile>) -> f64 {
    if profiles.is_empty() {
        return 50.0;
    }
    let n = profiles.len() as f64;
    let mean = profiles.values().map(|p| p.vitality_score).sum::<f64>() / n;
    let healthy_fraction = profiles
        .values()
        .filter(|p| p.vitality_score > 70.0)
        .count() as f64
        / n;
    let diversity_bonus = (30.0 * healthy_fraction).min(20.0);
    (mean + diversity_bonus).clamp(0.0, 100.0)
}

/// Penalizes sybil membership and ring size, rewards collectors with
/// broad collecting habits. Defaults to 50 with no collectors.
pub fn network_authenticity_score(
    profiles: &BTreeMap<String, WalletProfile>,
    clusters: &[SybilCluster],
    rings: &[CircularRing],
    total_collectors: usize,
) -> f64 {
    if total_collectors == 0 {
        return 50.0;
    }
    let total = total_collectors as f64;

    let sybil_members: usize = clusters.iter().map(|c| c.len()).sum();
    let sybil_penalty = 40.0 * (sybil_members as f64 / total);

    let largest_ring = rings.iter().map(|r| r.len()).max().unwrap_or(0);
    let ring_penalty = (5.0 * largest_ring as f64).min(30.0);

    let diverse_fraction = profiles
        .values()
        .filter(|p| p.unique_artists_collected > 3)
        .count() as f64
        / total;
    let diversity_bonus = (20.0 * diverse_fraction).min(20.0);

    (100.0 - sybil_penalty - ring_penalty + diversity_bonus).clamp(0.0, 100.0)
}

/// Share of legitimate volume, penalized per indicator, with a bonus
/// for a fully clean run. Defaults to 50 with no volume at all.
pub fn transaction_legitimacy_score(wash: &WashTradeReport) -> f64 {
    let total = wash.total_volume();
    if total.is_zero() {
        return 50.0;
    }
    let legit_fraction = (wash.legitimate_volume / total).to_f64().unwrap_or(0.0);
    let indicator_penalty = (3.0 * wash.indicator_count as f64).min(30.0);
    let clean_bonus = if wash.indicator_count == 0 { 20.0 } else { 0.0 };

    (80.0 * legit_fraction - indicator_penalty + clean_bonus).clamp(0.0, 100.0)
}

/// Weighted overall score; exactly the convex combination of the four
/// components.
pub fn overall_score(weights: ScoreWeights, scores: &ComponentScores) -> f64 {
    weights.vitality * scores.collector_vitality
        + weights.network * scores.network_authenticity
        + weights.transaction * scores.transaction_legitimacy
        + weights.timeline * scores.timeline_health
}

/// Count of severe red flags feeding the verdict tier.
pub fn severe_flag_count(
    largest_ring: usize,
    cluster_count: usize,
    dead_end_ratio: f64,
    timeline: &TimelineReport,
) -> u32 {
    let mut flags = 0;
    if largest_ring >= 4 {
        flags += 1;
    }
    if cluster_count >= 3 {
        flags += 1;
    }
    if dead_end_ratio > 0.5 {
        flags += 1;
    }
    if timeline.pattern == ActivityPattern::BurstSilence {
        flags += 1;
    }
    flags
}

/// Deterministic verdict from the overall score and severe-flag count.
pub fn suspicion_level(overall: f64, severe_flags: u32) -> SuspicionLevel {
    if severe_flags >= 3 || overall < 20.0 {
        SuspicionLevel::Severe
    } else if severe_flags >= 2 || overall < 35.0 {
        SuspicionLevel::High
    } else if severe_flags >= 1 || overall < 50.0 {
        SuspicionLevel::Moderate
    } else if overall < 70.0 {
        SuspicionLevel::Minor
    } else {
        SuspicionLevel::Clean
    }
}
