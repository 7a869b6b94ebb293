//! Circular trading detection.
//!
//! Finds cycles of length >= 3 in the directed wallet-to-wallet
//! transfer graph. The graph is rebuilt fresh per invocation; search
//! depth is capped to bound cost on dense graphs.

use provenance_core::config::AnalysisConfig;
use provenance_core::types::{CircularRing, TransferRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

const MIN_RING_LEN: usize = 3;

pub struct RingDetector {
    max_depth: usize,
}

impl RingDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_depth: config.max_ring_depth,
        }
    }

    /// Detect transfer cycles returning to their start wallet.
    ///
    /// Every unconsumed node seeds one depth-first search; once a node
    /// is part of a found ring it no longer seeds new searches, though
    /// it may still appear inside paths walked from other seeds.
    pub fn detect(&self, transfers: &[TransferRecord]) -> Vec<CircularRing> {
        let adjacency = build_adjacency(transfers);
        let mut consumed: HashSet<String> = HashSet::new();
        let mut rings = Vec::new();

        for start in adjacency.keys() {
            if consumed.contains(start) {
                continue;
            }
            let mut path = vec![start.clone()];
            if let Some(ring) = self.walk(start, start, &mut path, &adjacency) {
                for member in &ring {
                    consumed.insert(member.clone());
                }
                rings.push(CircularRing { path: ring });
            }
        }

        debug!(ring_count = rings.len(), "Circular trading detection complete");
        rings
    }

    /// Recursive step: extend `path` from `current`, returning the
    /// first cycle back to `start` of sufficient length. Closing edges
    /// are always checked; the depth cap only stops further extension,
    /// so cycles of exactly `max_depth` hops are still reported.
    fn walk(
        &self,
        start: &str,
        current: &str,
        path: &mut Vec<String>,
        adjacency: &BTreeMap<String, BTreeSet<String>>,
    ) -> Option<Vec<String>> {
        let neighbors = adjacency.get(current)?;

        for next in neighbors {
            if next == start {
                if path.len() >= MIN_RING_LEN {
                    return Some(path.clone());
                }
                continue;
            }
            if path.len() >= self.max_depth {
                continue;
            }
            if path.iter().any(|p| p == next) {
                continue;
            }
            path.push(next.clone());
            let found = self.walk(start, next, path, adjacency);
            path.pop();
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// Directed wallet-to-wallet edges; mints, burns, and self-transfers
/// are excluded.
fn build_adjacency(transfers: &[TransferRecord]) -> BTreeMap<String, BTreeSet<String>> {
    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for t in transfers {
        if !t.is_secondary() || t.from == t.to {
            continue;
        }
        adjacency
            .entry(t.from.clone())
            .or_default()
            .insert(t.to.clone());
    }
    adjacency
}
