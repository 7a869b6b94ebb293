//! Sybil cluster detection.
//!
//! Two complementary methods group wallets likely controlled by one
//! entity: a shared non-exchange funding source, and creation-time
//! proximity combined with behavioral similarity.

use provenance_core::config::AnalysisConfig;
use provenance_core::provider::FundingTotal;
use provenance_core::types::{ClusterEvidence, SybilCluster, WalletProfile};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

pub struct SybilDetector<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> SybilDetector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Detect clusters among the given collector profiles.
    ///
    /// `funding` maps each collector to its aggregated inbound currency
    /// sources. Output clusters always have at least two members;
    /// disjointness is best-effort (pair merging may leave overlaps
    /// between funding- and similarity-based clusters).
    pub fn detect(
        &self,
        profiles: &BTreeMap<String, WalletProfile>,
        funding: &HashMap<String, Vec<FundingTotal>>,
    ) -> Vec<SybilCluster> {
        let mut clusters = self.shared_funding_clusters(profiles, funding);
        self.merge_similarity_pairs(profiles, &mut clusters);

        clusters.retain(|c| c.len() >= 2);
        debug!(cluster_count = clusters.len(), "Sybil detection complete");
        clusters
    }

    /// Method A: group collectors whose largest funding source is the
    /// same non-allowlisted address.
    fn shared_funding_clusters(
        &self,
        profiles: &BTreeMap<String, WalletProfile>,
        funding: &HashMap<String, Vec<FundingTotal>>,
    ) -> Vec<SybilCluster> {
        let mut by_source: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for address in profiles.keys() {
            let Some(sources) = funding.get(address) else {
                continue;
            };
            let Some(top) = sources
                .iter()
                .max_by(|a, b| a.total_value.cmp(&b.total_value))
            else {
                continue;
            };
            if self.config.is_allowlisted(&top.source) {
                continue;
            }
            by_source
                .entry(top.source.to_lowercase())
                .or_default()
                .insert(address.clone());
        }

        by_source
            .into_iter()
            .filter(|(_, members)| members.len() >= self.config.min_shared_funding_wallets)
            .map(|(source, members)| SybilCluster {
                members,
                evidence: ClusterEvidence::SharedFundingSource { source },
            })
            .collect()
    }

    /// Method B: pair wallets first seen within the configured window
    /// and behaving near-identically, merging pairs into any cluster
    /// that already holds one of them.
    fn merge_similarity_pairs(
        &self,
        profiles: &BTreeMap<String, WalletProfile>,
        clusters: &mut Vec<SybilCluster>,
    ) {
        let addresses: Vec<&String> = profiles.keys().collect();

        for i in 0..addresses.len() {
            for j in (i + 1)..addresses.len() {
                let a = &profiles[addresses[i]];
                let b = &profiles[addresses[j]];

                let (Some(fa), Some(fb)) = (a.first_seen, b.first_seen) else {
                    continue;
                };
                if (fa - fb).num_days().abs() > self.config.sybil_window_days {
                    continue;
                }

                if behavioral_similarity(a, b) > self.config.sybil_similarity_threshold {
                    self.absorb_pair(clusters, &a.address, &b.address);
                }
            }
        }
    }

    fn absorb_pair(&self, clusters: &mut Vec<SybilCluster>, a: &str, b: &str) {
        for cluster in clusters.iter_mut() {
            if cluster.members.contains(a) || cluster.members.contains(b) {
                cluster.members.insert(a.to_string());
                cluster.members.insert(b.to_string());
                return;
            }
        }
        clusters.push(SybilCluster {
            members: [a.to_string(), b.to_string()].into_iter().collect(),
            evidence: ClusterEvidence::BehavioralSimilarity,
        });
    }
}

/// Average of up to five binary checks; checks with missing data on
/// either side are skipped, so the denominator varies with data
/// availability.
fn behavioral_similarity(a: &WalletProfile, b: &WalletProfile) -> f64 {
    let mut passed = 0u32;
    let mut applicable = 0u32;

    // Hold times within two days of each other; only comparable when
    // both wallets completed at least one hold.
    if a.avg_hold_time_days > 0.0 && b.avg_hold_time_days > 0.0 {
        applicable += 1;
        if (a.avg_hold_time_days - b.avg_hold_time_days).abs() <= 2.0 {
            passed += 1;
        }
    }

    // Transaction counts within 30% of each other.
    let max_tx = a.total_transactions.max(b.total_transactions);
    if max_tx > 0 {
        applicable += 1;
        let min_tx = a.total_transactions.min(b.total_transactions);
        if min_tx as f64 / max_tx as f64 > 0.7 {
            passed += 1;
        }
    }

    applicable += 1;
    if a.single_artist_ratio > 0.9 && b.single_artist_ratio > 0.9 {
        passed += 1;
    }

    applicable += 1;
    if !a.nft_activity_outside_artist && !b.nft_activity_outside_artist {
        passed += 1;
    }

    applicable += 1;
    if a.immediate_flip_count.abs_diff(b.immediate_flip_count) <= 1 {
        passed += 1;
    }

    passed as f64 / applicable as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day)
    }

    fn profile(address: &str, first_seen_day: i64) -> WalletProfile {
        WalletProfile {
            address: address.into(),
            first_seen: Some(at(first_seen_day)),
            last_active: Some(at(first_seen_day)),
            total_transactions: 2,
            unique_artists_collected: 1,
            nft_activity_outside_artist: false,
            single_artist_ratio: 1.0,
            avg_hold_time_days: 0.0,
            immediate_flip_count: 0,
            vitality_score: 30.0,
            suspicion_flags: Default::default(),
        }
    }

    fn funding_entry(source: &str, value: i64) -> FundingTotal {
        FundingTotal {
            source: source.into(),
            total_value: Decimal::new(value, 0),
        }
    }

    fn profiles_of(list: Vec<WalletProfile>) -> BTreeMap<String, WalletProfile> {
        list.into_iter().map(|p| (p.address.clone(), p)).collect()
    }

    #[test]
    fn test_three_wallets_sharing_unknown_funder_cluster() {
        let profiles = profiles_of(vec![
            profile("0xa", 0),
            profile("0xb", 100),
            profile("0xc", 200),
        ]);
        let mut funding = HashMap::new();
        for addr in ["0xa", "0xb", "0xc"] {
            funding.insert(addr.to_string(), vec![funding_entry("0xshadow", 50)]);
        }

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &funding);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        match &clusters[0].evidence {
            ClusterEvidence::SharedFundingSource { source } => assert_eq!(source, "0xshadow"),
            other => panic!("unexpected evidence: {other:?}"),
        }
    }

    #[test]
    fn test_allowlisted_exchange_funder_forms_no_cluster() {
        let profiles = profiles_of(vec![
            profile("0xa", 0),
            profile("0xb", 100),
            profile("0xc", 200),
        ]);
        let mut funding = HashMap::new();
        for addr in ["0xa", "0xb", "0xc"] {
            funding.insert(addr.to_string(), vec![funding_entry("0xExchange", 50)]);
        }

        let cfg = AnalysisConfig::with_allowlist(["0xexchange"]);
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &funding);

        assert!(clusters.is_empty());
    }

    #[test]
    fn test_two_shared_wallets_below_minimum() {
        let profiles = profiles_of(vec![profile("0xa", 0), profile("0xb", 100)]);
        let mut funding = HashMap::new();
        for addr in ["0xa", "0xb"] {
            funding.insert(addr.to_string(), vec![funding_entry("0xshadow", 50)]);
        }

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &funding);

        assert!(clusters.is_empty());
    }

    #[test]
    fn test_behavioral_twins_cluster() {
        // Same week, identical single-artist behavior, no external
        // activity, matching flip counts. Similarity is 4/4 since the
        // hold-time check is skipped (no holds on either side).
        let profiles = profiles_of(vec![profile("0xa", 0), profile("0xb", 3)]);

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &HashMap::new());

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert!(matches!(
            clusters[0].evidence,
            ClusterEvidence::BehavioralSimilarity
        ));
    }

    #[test]
    fn test_distant_creation_times_do_not_pair() {
        let profiles = profiles_of(vec![profile("0xa", 0), profile("0xb", 60)]);

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &HashMap::new());

        assert!(clusters.is_empty());
    }

    #[test]
    fn test_dissimilar_wallets_do_not_pair() {
        let mut organic = profile("0xb", 2);
        organic.nft_activity_outside_artist = true;
        organic.single_artist_ratio = 0.2;
        organic.total_transactions = 40;
        organic.unique_artists_collected = 6;

        let profiles = profiles_of(vec![profile("0xa", 0), organic]);

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &HashMap::new());

        assert!(clusters.is_empty());
    }

    #[test]
    fn test_similar_pair_merges_into_funding_cluster() {
        let profiles = profiles_of(vec![
            profile("0xa", 0),
            profile("0xb", 1),
            profile("0xc", 2),
            profile("0xd", 3),
        ]);
        let mut funding = HashMap::new();
        for addr in ["0xa", "0xb", "0xc"] {
            funding.insert(addr.to_string(), vec![funding_entry("0xshadow", 50)]);
        }

        let cfg = AnalysisConfig::default();
        let clusters = SybilDetector::new(&cfg).detect(&profiles, &funding);

        // 0xd behaves like the funded trio and was created alongside
        // them, so it is absorbed rather than seeding a second cluster.
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 4);
    }
}
