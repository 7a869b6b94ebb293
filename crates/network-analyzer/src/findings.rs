//! Findings compilation.
//!
//! Turns raw detections into an ordered, human-readable report. The
//! ordering is deterministic: sybil clusters, circular trading, dead
//! ends, timeline anomalies, then positive findings.

use crate::timeline::TimelineReport;
use provenance_core::types::{
    ActivityPattern, CircularRing, Finding, FindingKind, FindingSeverity, SybilCluster,
    WalletProfile,
};
use serde_json::json;
use std::collections::BTreeMap;

pub fn compile(
    profiles: &BTreeMap<String, WalletProfile>,
    clusters: &[SybilCluster],
    rings: &[CircularRing],
    dead_ends: &[String],
    timeline: &TimelineReport,
) -> Vec<Finding> {
    let total_collectors = profiles.len();
    let mut findings = Vec::new();

    if !clusters.is_empty() {
        let member_count: usize = clusters.iter().map(|c| c.len()).sum();
        findings.push(Finding {
            kind: FindingKind::SybilClusters,
            severity: FindingSeverity::High,
            title: "Sybil wallet clusters detected".to_string(),
            description: format!(
                "{} wallet cluster(s) spanning {} collector addresses appear to share a \
                 single controlling entity.",
                clusters.len(),
                member_count
            ),
            details: json!({
                "cluster_count": clusters.len(),
                "member_count": member_count,
                "clusters": clusters,
            }),
        });
    }

    if !rings.is_empty() {
        let largest = rings.iter().map(|r| r.len()).max().unwrap_or(0);
        findings.push(Finding {
            kind: FindingKind::CircularTrading,
            severity: FindingSeverity::High,
            title: "Circular trading rings detected".to_string(),
            description: format!(
                "{} transfer cycle(s) return works to their origin wallet; the largest \
                 involves {} addresses.",
                rings.len(),
                largest
            ),
            details: json!({
                "ring_count": rings.len(),
                "largest_ring": largest,
                "rings": rings.iter().map(|r| &r.path).collect::<Vec<_>>(),
            }),
        });
    }

    if !dead_ends.is_empty() {
        let ratio = if total_collectors == 0 {
            0.0
        } else {
            dead_ends.len() as f64 / total_collectors as f64
        };
        let severity = if ratio > 0.4 {
            FindingSeverity::High
        } else if ratio > 0.2 {
            FindingSeverity::Moderate
        } else {
            FindingSeverity::Minor
        };
        findings.push(Finding {
            kind: FindingKind::DeadEndWallets,
            severity,
            title: "Dead-end collector wallets".to_string(),
            description: format!(
                "{} of {} collectors received work and then went silent.",
                dead_ends.len(),
                total_collectors
            ),
            details: json!({
                "count": dead_ends.len(),
                "ratio": ratio,
                "addresses": dead_ends,
            }),
        });
    }

    match timeline.pattern {
        ActivityPattern::BurstSilence => findings.push(Finding {
            kind: FindingKind::TimelineAnomaly,
            severity: FindingSeverity::High,
            title: "Burst-and-silence activity timeline".to_string(),
            description: "Collecting activity spiked early and then stopped almost \
                          entirely, a shape typical of artificial inflation."
                .to_string(),
            details: json!({
                "pattern": timeline.pattern,
                "score": timeline.score,
                "monthly_counts": timeline.monthly_counts,
            }),
        }),
        ActivityPattern::Declining => findings.push(Finding {
            kind: FindingKind::TimelineAnomaly,
            severity: FindingSeverity::Moderate,
            title: "Sharply declining activity timeline".to_string(),
            description: "Early collecting activity dwarfs recent months.".to_string(),
            details: json!({
                "pattern": timeline.pattern,
                "score": timeline.score,
                "monthly_counts": timeline.monthly_counts,
            }),
        }),
        _ => {}
    }

    let vital: Vec<&str> = profiles
        .values()
        .filter(|p| p.vitality_score > 70.0)
        .map(|p| p.address.as_str())
        .collect();
    if !vital.is_empty() {
        findings.push(Finding {
            kind: FindingKind::VerifiedCollectors,
            severity: FindingSeverity::Positive,
            title: "Active, diverse collectors present".to_string(),
            description: format!(
                "{} of {} collectors show healthy cross-creator collecting behavior.",
                vital.len(),
                total_collectors
            ),
            details: json!({
                "count": vital.len(),
                "addresses": vital,
            }),
        });
    }

    findings
}
