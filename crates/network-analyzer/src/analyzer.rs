//! Analysis orchestration.
//!
//! Fetches each collector's history through the provider, then runs
//! the synchronous detection pipeline: profiling, sybil clustering,
//! ring detection, dead-end identification, wash-trade classification,
//! timeline classification, scoring, and findings compilation.

use crate::{dead_end, findings, profiler::WalletProfiler, rings::RingDetector, scoring,
    scoring::ScoreWeights, sybil::SybilDetector, timeline, wash_trade};
use chrono::{DateTime, Utc};
use provenance_core::config::AnalysisConfig;
use provenance_core::provider::{FundingTotal, TransferHistory};
use provenance_core::types::{
    CircularRing, ComponentScores, IdentitySignals, NetworkAnalysis, SybilCluster, TransferRecord,
    WalletProfile,
};
use provenance_core::Result;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Everything the synchronous pipeline needs, prefetched.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    pub collectors: Vec<String>,
    /// Full cross-creator history per collector.
    pub histories: HashMap<String, Vec<TransferRecord>>,
    /// Aggregated inbound currency sources per collector.
    pub funding: HashMap<String, Vec<FundingTotal>>,
    pub identities: HashMap<String, IdentitySignals>,
    /// Transfers of the target creator's works, shared by all steps.
    pub transfers: Vec<TransferRecord>,
}

/// One completed run: the analysis record plus the supporting rows
/// that are persisted alongside it.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub analysis: NetworkAnalysis,
    pub profiles: Vec<WalletProfile>,
    pub clusters: Vec<SybilCluster>,
    pub rings: Vec<CircularRing>,
}

pub struct NetworkAnalyzer<P> {
    provider: P,
    config: AnalysisConfig,
}

impl<P: TransferHistory> NetworkAnalyzer<P> {
    pub fn new(provider: P, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    /// Analyze one creator's collector network.
    ///
    /// `transfers` are the already-resolved transfers of the creator's
    /// works; per-collector history is fetched from the provider. A
    /// provider failure for a single wallet degrades that wallet to
    /// its visible target-creator history instead of aborting the run.
    pub async fn analyze_artist_network(
        &self,
        artist: &str,
        collectors: &[String],
        transfers: &[TransferRecord],
    ) -> Result<AnalysisRun> {
        let snapshot = self.fetch_snapshot(collectors, transfers).await;
        Ok(self.analyze_snapshot(artist, &snapshot, Utc::now()))
    }

    async fn fetch_snapshot(
        &self,
        collectors: &[String],
        transfers: &[TransferRecord],
    ) -> NetworkSnapshot {
        let mut snapshot = NetworkSnapshot {
            collectors: collectors.to_vec(),
            transfers: transfers.to_vec(),
            ..Default::default()
        };

        for address in collectors {
            let history = match self.provider.transfers_for(address).await {
                Ok(history) => history,
                Err(err) => {
                    warn!(%address, %err, "History fetch failed; using visible transfers only");
                    transfers
                        .iter()
                        .filter(|t| &t.from == address || &t.to == address)
                        .cloned()
                        .collect()
                }
            };
            snapshot.histories.insert(address.clone(), history);

            match self.provider.inbound_value_transfers(address).await {
                Ok(funding) => {
                    snapshot.funding.insert(address.clone(), funding);
                }
                Err(err) => {
                    warn!(%address, %err, "Funding fetch failed; skipping funding evidence");
                }
            }

            match self.provider.identity_signals(address).await {
                Ok(Some(signals)) => {
                    snapshot.identities.insert(address.clone(), signals);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%address, %err, "Identity fetch failed; treating wallet as anonymous");
                }
            }
        }

        snapshot
    }

    /// The synchronous pipeline. Deterministic for a fixed snapshot
    /// and `as_of`: re-running identical input yields identical scores.
    pub fn analyze_snapshot(
        &self,
        artist: &str,
        snapshot: &NetworkSnapshot,
        as_of: DateTime<Utc>,
    ) -> AnalysisRun {
        info!(
            %artist,
            collectors = snapshot.collectors.len(),
            transfers = snapshot.transfers.len(),
            "Starting network analysis"
        );

        // Step 1: behavioral profiles.
        let profiler = WalletProfiler::new(&self.config);
        let empty: Vec<TransferRecord> = Vec::new();
        let profiles: BTreeMap<String, WalletProfile> = snapshot
            .collectors
            .iter()
            .map(|address| {
                let history = snapshot.histories.get(address).unwrap_or(&empty);
                let identity = snapshot.identities.get(address).copied();
                (
                    address.clone(),
                    profiler.profile(address, artist, history, identity, as_of),
                )
            })
            .collect();

        // Steps 2-6: detectors over the immutable inputs.
        let clusters = SybilDetector::new(&self.config).detect(&profiles, &snapshot.funding);
        let rings = RingDetector::new(&self.config).detect(&snapshot.transfers);
        let dead_ends = dead_end::identify(&profiles, &snapshot.identities, &self.config, as_of);
        let wash = wash_trade::analyze(&snapshot.transfers, &profiles);
        let timeline = timeline::analyze(&snapshot.transfers, as_of);

        // Step 7: scores and verdict.
        let scores = ComponentScores {
            collector_vitality: scoring::collector_vitality_score(&profiles),
            network_authenticity: scoring::network_authenticity_score(
                &profiles,
                &clusters,
                &rings,
                profiles.len(),
            ),
            transaction_legitimacy: scoring::transaction_legitimacy_score(&wash),
            timeline_health: timeline.score,
        };
        let overall = scoring::overall_score(ScoreWeights::DEFAULT, &scores);

        let largest_ring = rings.iter().map(|r| r.len()).max().unwrap_or(0);
        let dead_end_ratio = if profiles.is_empty() {
            0.0
        } else {
            dead_ends.len() as f64 / profiles.len() as f64
        };
        let severe_flags =
            scoring::severe_flag_count(largest_ring, clusters.len(), dead_end_ratio, &timeline);
        let level = scoring::suspicion_level(overall, severe_flags);

        // Step 8: findings.
        let findings = findings::compile(&profiles, &clusters, &rings, &dead_ends, &timeline);

        debug!(
            overall = overall,
            level = level.as_str(),
            severe_flags,
            "Network analysis scored"
        );

        let analysis = NetworkAnalysis {
            id: Uuid::new_v4(),
            artist_address: artist.to_string(),
            analyzed_at: as_of,
            total_collectors: profiles.len() as u64,
            sybil_cluster_count: clusters.len() as u64,
            circular_trading_detected: !rings.is_empty(),
            circular_ring_size: largest_ring as u64,
            dead_end_wallets: dead_ends.len() as u64,
            wash_trade_indicators: wash.indicator_count,
            self_dealing_volume: wash.suspicious_volume,
            legitimate_volume: wash.legitimate_volume,
            activity_pattern: timeline.pattern,
            scores,
            overall_authenticity_score: overall,
            suspicion_level: level,
            findings,
        };

        AnalysisRun {
            analysis,
            profiles: profiles.into_values().collect(),
            clusters,
            rings,
        }
    }
}

/// Convenience for volume totals in logs and summaries.
pub fn total_volume(analysis: &NetworkAnalysis) -> Decimal {
    analysis.self_dealing_volume + analysis.legitimate_volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use provenance_core::provider::InMemoryTransferHistory;
    use provenance_core::types::{ActivityPattern, SuspicionLevel, NULL_ADDRESS};

    const ARTIST: &str = "0xartist";

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day)
    }

    fn transfer(token: &str, from: &str, to: &str, day: i64, value: i64) -> TransferRecord {
        TransferRecord {
            token_id: token.into(),
            artist: ARTIST.into(),
            from: from.into(),
            to: to.into(),
            amount: 1,
            value: Decimal::new(value, 0),
            timestamp: Some(at(day)),
        }
    }

    fn analyzer(transfers: Vec<TransferRecord>) -> NetworkAnalyzer<InMemoryTransferHistory> {
        NetworkAnalyzer::new(
            InMemoryTransferHistory::new(transfers),
            AnalysisConfig::default(),
        )
    }

    #[test]
    fn test_empty_input_yields_mid_range_defaults() {
        let analyzer = analyzer(Vec::new());
        let run = analyzer.analyze_snapshot(ARTIST, &NetworkSnapshot::default(), at(0));

        let a = &run.analysis;
        assert_eq!(a.total_collectors, 0);
        assert_eq!(a.activity_pattern, ActivityPattern::NoData);
        assert!((a.scores.collector_vitality - 50.0).abs() < 1e-9);
        assert!((a.scores.network_authenticity - 50.0).abs() < 1e-9);
        assert!((a.scores.transaction_legitimacy - 50.0).abs() < 1e-9);
        assert!((a.overall_authenticity_score - 50.0).abs() < 1e-9);
        assert!(a.findings.is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent_for_fixed_inputs() {
        let transfers: Vec<TransferRecord> = (0..6)
            .map(|i| {
                transfer(
                    &format!("t{i}"),
                    NULL_ADDRESS,
                    &format!("0xc{i}"),
                    i * 15,
                    10,
                )
            })
            .collect();
        let collectors: Vec<String> = (0..6).map(|i| format!("0xc{i}")).collect();
        let analyzer = analyzer(transfers.clone());

        let snapshot = tokio_test::block_on(analyzer.fetch_snapshot(&collectors, &transfers));
        let first = analyzer.analyze_snapshot(ARTIST, &snapshot, at(100));
        let second = analyzer.analyze_snapshot(ARTIST, &snapshot, at(100));

        let a = &first.analysis;
        let b = &second.analysis;
        assert_eq!(a.overall_authenticity_score, b.overall_authenticity_score);
        assert_eq!(a.suspicion_level, b.suspicion_level);
        assert_eq!(a.scores.collector_vitality, b.scores.collector_vitality);
        assert_eq!(a.scores.network_authenticity, b.scores.network_authenticity);
        assert_eq!(a.wash_trade_indicators, b.wash_trade_indicators);
    }

    #[test]
    fn test_overall_matches_component_weighting() {
        let transfers = vec![
            transfer("t1", NULL_ADDRESS, "0xc1", 0, 5),
            transfer("t1", "0xc1", "0xc2", 40, 8),
            transfer("t2", NULL_ADDRESS, "0xc2", 70, 5),
        ];
        let collectors = vec!["0xc1".to_string(), "0xc2".to_string()];
        let analyzer = analyzer(transfers.clone());

        let snapshot = tokio_test::block_on(analyzer.fetch_snapshot(&collectors, &transfers));
        let run = analyzer.analyze_snapshot(ARTIST, &snapshot, at(90));

        let s = &run.analysis.scores;
        let expected = 0.35 * s.collector_vitality
            + 0.30 * s.network_authenticity
            + 0.20 * s.transaction_legitimacy
            + 0.15 * s.timeline_health;
        assert!((run.analysis.overall_authenticity_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ring_and_burst_raise_verdict() {
        // Three wallets cycle one token, then everything goes quiet.
        let transfers = vec![
            transfer("t1", NULL_ADDRESS, "0xc1", 0, 10),
            transfer("t1", "0xc1", "0xc2", 1, 10),
            transfer("t1", "0xc2", "0xc3", 2, 10),
            transfer("t1", "0xc3", "0xc1", 3, 10),
            transfer("t1", "0xc1", "0xc2", 4, 10),
            transfer("t1", "0xc2", "0xc3", 5, 10),
            transfer("t1", "0xc3", "0xc1", 6, 10),
        ];
        let collectors: Vec<String> = (1..=3).map(|i| format!("0xc{i}")).collect();
        let analyzer = analyzer(transfers.clone());

        let snapshot = tokio_test::block_on(analyzer.fetch_snapshot(&collectors, &transfers));
        let run = analyzer.analyze_snapshot(ARTIST, &snapshot, at(200));

        let a = &run.analysis;
        assert!(a.circular_trading_detected);
        assert_eq!(a.circular_ring_size, 3);
        assert_eq!(a.activity_pattern, ActivityPattern::BurstSilence);
        assert!(a.wash_trade_indicators > 0);
        assert!(a.suspicion_level >= SuspicionLevel::Moderate);
        assert!(a.overall_authenticity_score < 50.0);
    }

    #[test]
    fn test_total_volume_sums_both_classes() {
        let transfers = vec![
            transfer("t1", NULL_ADDRESS, "0xc1", 0, 5),
            transfer("t1", "0xc1", "0xc2", 40, 8),
            transfer("t2", NULL_ADDRESS, "0xc2", 70, 5),
        ];
        let collectors = vec!["0xc1".to_string(), "0xc2".to_string()];
        let analyzer = analyzer(transfers.clone());

        let snapshot = tokio_test::block_on(analyzer.fetch_snapshot(&collectors, &transfers));
        let run = analyzer.analyze_snapshot(ARTIST, &snapshot, at(90));

        let a = &run.analysis;
        assert_eq!(total_volume(a), a.self_dealing_volume + a.legitimate_volume);
        assert!(total_volume(a) > Decimal::ZERO);
    }
}
