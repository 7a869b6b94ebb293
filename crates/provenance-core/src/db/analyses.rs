//! Persistence for analysis runs.
//!
//! All tables are append-only: a run's record and its supporting rows
//! are inserted in one transaction and never updated afterward.

use crate::types::{CircularRing, NetworkAnalysis, SybilCluster, WalletProfile};
use crate::Result;
use sqlx::PgPool;
use tracing::debug;

/// Repository for analysis output records.
pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one completed run atomically: the analysis record plus
    /// its wallet profiles, sybil clusters, and circular rings.
    pub async fn insert_run(
        &self,
        analysis: &NetworkAnalysis,
        profiles: &[WalletProfile],
        clusters: &[SybilCluster],
        rings: &[CircularRing],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO network_analyses (
                id, artist_address, analyzed_at, total_collectors,
                sybil_cluster_count, circular_trading_detected, circular_ring_size,
                dead_end_wallets, wash_trade_indicators,
                self_dealing_volume, legitimate_volume, activity_pattern,
                collector_vitality_score, network_authenticity_score,
                transaction_legitimacy_score, timeline_health_score,
                overall_authenticity_score, suspicion_level, findings
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(analysis.id)
        .bind(&analysis.artist_address)
        .bind(analysis.analyzed_at)
        .bind(analysis.total_collectors as i64)
        .bind(analysis.sybil_cluster_count as i64)
        .bind(analysis.circular_trading_detected)
        .bind(analysis.circular_ring_size as i64)
        .bind(analysis.dead_end_wallets as i64)
        .bind(analysis.wash_trade_indicators as i64)
        .bind(analysis.self_dealing_volume)
        .bind(analysis.legitimate_volume)
        .bind(analysis.activity_pattern.as_str())
        .bind(analysis.scores.collector_vitality)
        .bind(analysis.scores.network_authenticity)
        .bind(analysis.scores.transaction_legitimacy)
        .bind(analysis.scores.timeline_health)
        .bind(analysis.overall_authenticity_score)
        .bind(analysis.suspicion_level.as_str())
        .bind(serde_json::to_value(&analysis.findings)?)
        .execute(&mut *tx)
        .await?;

        for profile in profiles {
            sqlx::query(
                r#"
                INSERT INTO analysis_wallet_profiles (
                    analysis_id, address, first_seen, last_active,
                    total_transactions, unique_artists_collected,
                    nft_activity_outside_artist, single_artist_ratio,
                    avg_hold_time_days, immediate_flip_count,
                    vitality_score, suspicion_flags
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(analysis.id)
            .bind(&profile.address)
            .bind(profile.first_seen)
            .bind(profile.last_active)
            .bind(profile.total_transactions as i64)
            .bind(profile.unique_artists_collected as i64)
            .bind(profile.nft_activity_outside_artist)
            .bind(profile.single_artist_ratio)
            .bind(profile.avg_hold_time_days)
            .bind(profile.immediate_flip_count as i64)
            .bind(profile.vitality_score)
            .bind(serde_json::to_value(&profile.suspicion_flags)?)
            .execute(&mut *tx)
            .await?;
        }

        for (index, cluster) in clusters.iter().enumerate() {
            let members: Vec<String> = cluster.members.iter().cloned().collect();
            sqlx::query(
                r#"
                INSERT INTO analysis_sybil_clusters
                    (analysis_id, cluster_index, members, evidence)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(analysis.id)
            .bind(index as i32)
            .bind(&members)
            .bind(serde_json::to_value(&cluster.evidence)?)
            .execute(&mut *tx)
            .await?;
        }

        for (index, ring) in rings.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO analysis_circular_rings (analysis_id, ring_index, path)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(analysis.id)
            .bind(index as i32)
            .bind(&ring.path)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            analysis_id = %analysis.id,
            artist = %analysis.artist_address,
            profiles = profiles.len(),
            clusters = clusters.len(),
            rings = rings.len(),
            "Persisted analysis run"
        );

        Ok(())
    }
}
