//! Wallet behavioral profiling.
//!
//! Builds a [`WalletProfile`] per collector from the wallet's full
//! cross-creator transfer history. Pure computation: the same history
//! and `as_of` timestamp always yield the same profile.

use chrono::{DateTime, Utc};
use provenance_core::config::AnalysisConfig;
use provenance_core::types::{IdentitySignals, SuspicionFlag, TransferRecord, WalletProfile};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct WalletProfiler<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> WalletProfiler<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Profile one collector against the target creator.
    ///
    /// `history` is every transfer touching `address` across all
    /// creators. Missing timestamps degrade the affected factors to
    /// neutral; nothing here fails.
    pub fn profile(
        &self,
        address: &str,
        artist: &str,
        history: &[TransferRecord],
        identity: Option<IdentitySignals>,
        as_of: DateTime<Utc>,
    ) -> WalletProfile {
        let touching: Vec<&TransferRecord> = history
            .iter()
            .filter(|t| t.from == address || t.to == address)
            .collect();

        let timestamps: Vec<DateTime<Utc>> =
            touching.iter().filter_map(|t| t.timestamp).collect();
        let first_seen = timestamps.iter().min().copied();
        let last_active = timestamps.iter().max().copied();
        let total_transactions = touching.len() as u64;

        let inbound: Vec<&&TransferRecord> = touching.iter().filter(|t| t.to == address).collect();
        let unique_artists_collected = inbound
            .iter()
            .map(|t| t.artist.as_str())
            .collect::<BTreeSet<_>>()
            .len() as u64;
        let nft_activity_outside_artist = touching.iter().any(|t| t.artist != artist);

        let received_total: u64 = inbound.iter().map(|t| t.amount).sum();
        let received_from_artist: u64 = inbound
            .iter()
            .filter(|t| t.artist == artist)
            .map(|t| t.amount)
            .sum();
        let single_artist_ratio = if received_total == 0 {
            0.0
        } else {
            (received_from_artist as f64 / received_total as f64).clamp(0.0, 1.0)
        };

        let holds = hold_durations_days(address, &touching);
        let avg_hold_time_days = if holds.is_empty() {
            0.0
        } else {
            holds.iter().sum::<f64>() / holds.len() as f64
        };
        let immediate_flip_count = holds.iter().filter(|&&d| d < 1.0).count() as u64;

        let vitality_score = self.vitality(
            unique_artists_collected,
            nft_activity_outside_artist,
            single_artist_ratio,
            avg_hold_time_days,
            immediate_flip_count,
            total_transactions,
            last_active,
            identity,
            as_of,
        );

        let mut suspicion_flags = BTreeSet::new();
        if single_artist_ratio > 0.95 {
            suspicion_flags.insert(SuspicionFlag::SingleArtistCollector);
        }
        if avg_hold_time_days > 0.0 && avg_hold_time_days < 1.0 {
            suspicion_flags.insert(SuspicionFlag::VeryShortHoldTimes);
        }
        if immediate_flip_count > 3 {
            suspicion_flags.insert(SuspicionFlag::FrequentImmediateFlips);
        }
        if let Some(last) = last_active {
            if (as_of - last).num_days() > self.config.dormancy_days {
                suspicion_flags.insert(SuspicionFlag::DormantWallet);
            }
        }
        if total_transactions < 3 {
            suspicion_flags.insert(SuspicionFlag::MinimalActivity);
        }
        if !nft_activity_outside_artist {
            suspicion_flags.insert(SuspicionFlag::NoExternalNftActivity);
        }

        WalletProfile {
            address: address.to_string(),
            first_seen,
            last_active,
            total_transactions,
            unique_artists_collected,
            nft_activity_outside_artist,
            single_artist_ratio,
            avg_hold_time_days,
            immediate_flip_count,
            vitality_score,
            suspicion_flags,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn vitality(
        &self,
        unique_artists: u64,
        outside_activity: bool,
        single_artist_ratio: f64,
        avg_hold_time_days: f64,
        immediate_flips: u64,
        total_transactions: u64,
        last_active: Option<DateTime<Utc>>,
        identity: Option<IdentitySignals>,
        as_of: DateTime<Utc>,
    ) -> f64 {
        let mut score = 50.0;

        if unique_artists > 5 {
            score += 15.0;
        } else if unique_artists > 1 {
            score += 10.0;
        }
        if outside_activity {
            score += 10.0;
        }
        if let Some(signals) = identity {
            score += 10.0 * signals.signal_count() as f64;
        }

        // Recency adjustment only when the wallet has usable timestamps;
        // missing data contributes nothing.
        if let Some(last) = last_active {
            let idle_days = (as_of - last).num_days();
            if idle_days > self.config.dormancy_days {
                score -= 20.0;
            } else if idle_days < 30 {
                score += 10.0;
            } else if idle_days < 90 {
                score += 5.0;
            }
        }

        if single_artist_ratio > 0.9 {
            score -= 15.0;
        }
        if immediate_flips > 2 {
            score -= 10.0;
        }
        if avg_hold_time_days > 0.0 && avg_hold_time_days < 1.0 {
            score -= 15.0;
        }
        if total_transactions < 3 {
            score -= 10.0;
        }

        score.clamp(0.0, 100.0)
    }
}

/// Match acquire → dispose pairs per token (FIFO) and return hold
/// durations in days. Transfers without timestamps are skipped.
fn hold_durations_days(address: &str, touching: &[&TransferRecord]) -> Vec<f64> {
    let mut by_token: BTreeMap<&str, (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>)> = BTreeMap::new();
    for t in touching {
        let Some(ts) = t.timestamp else { continue };
        let entry = by_token.entry(t.token_id.as_str()).or_default();
        if t.to == address {
            entry.0.push(ts);
        } else if t.from == address {
            entry.1.push(ts);
        }
    }

    let mut durations = Vec::new();
    for (_, (mut acquired, mut disposed)) in by_token {
        acquired.sort();
        disposed.sort();
        let mut queue: VecDeque<DateTime<Utc>> = acquired.into_iter().collect();
        for sale in disposed.drain(..) {
            if let Some(&bought) = queue.front() {
                // A disposal predating every held acquisition means the
                // token was acquired outside the visible window; skip it.
                if bought <= sale {
                    queue.pop_front();
                    durations.push((sale - bought).num_seconds() as f64 / SECONDS_PER_DAY);
                }
            }
        }
    }
    durations
}
