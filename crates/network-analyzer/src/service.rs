//! Analysis service: orchestrates a run and persists it atomically.
//!
//! Concurrent runs for different creators are independent; runs for
//! the same creator are rejected while one is in flight (advisory
//! guard, since callers are expected to serialize by artist anyway).

use crate::analyzer::{total_volume, AnalysisRun, NetworkAnalyzer};
use dashmap::DashMap;
use provenance_core::db::AnalysisRepository;
use provenance_core::provider::TransferHistory;
use provenance_core::types::{NetworkAnalysis, TransferRecord};
use provenance_core::{Error, Result};
use tracing::info;

pub struct AnalysisService<P> {
    analyzer: NetworkAnalyzer<P>,
    repository: AnalysisRepository,
    in_flight: DashMap<String, ()>,
}

impl<P: TransferHistory> AnalysisService<P> {
    pub fn new(analyzer: NetworkAnalyzer<P>, repository: AnalysisRepository) -> Self {
        Self {
            analyzer,
            repository,
            in_flight: DashMap::new(),
        }
    }

    /// Run one analysis and persist it. Persistence failure is a hard
    /// error: the result would otherwise be lost, and an idempotent
    /// re-run is the recovery path.
    pub async fn run(
        &self,
        artist: &str,
        collectors: &[String],
        transfers: &[TransferRecord],
    ) -> Result<NetworkAnalysis> {
        let _guard = self.acquire(artist)?;

        let run = self
            .analyzer
            .analyze_artist_network(artist, collectors, transfers)
            .await?;
        self.persist(&run).await?;

        info!(
            artist = %artist,
            analysis_id = %run.analysis.id,
            level = run.analysis.suspicion_level.as_str(),
            score = run.analysis.overall_authenticity_score,
            volume = %total_volume(&run.analysis),
            "Analysis run persisted"
        );
        Ok(run.analysis)
    }

    async fn persist(&self, run: &AnalysisRun) -> Result<()> {
        self.repository
            .insert_run(&run.analysis, &run.profiles, &run.clusters, &run.rings)
            .await
    }

    fn acquire(&self, artist: &str) -> Result<RunGuard<'_>> {
        match self.in_flight.entry(artist.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::AnalysisInProgress {
                artist: artist.to_string(),
            }),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(());
                Ok(RunGuard {
                    in_flight: &self.in_flight,
                    artist: artist.to_string(),
                })
            }
        }
    }
}

/// Releases the per-artist slot when the run finishes or fails.
struct RunGuard<'a> {
    in_flight: &'a DashMap<String, ()>,
    artist: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.artist);
    }
}
