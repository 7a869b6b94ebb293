//! Dead-end wallet identification.
//!
//! A dead end receives a piece and then goes silent: long-inactive (or
//! never timestamped), at most one transaction, no activity outside
//! the target creator, and no verified identity. Such wallets are a
//! common way to fake collector counts.

use chrono::{DateTime, Utc};
use provenance_core::config::AnalysisConfig;
use provenance_core::types::{IdentitySignals, WalletProfile};
use std::collections::{BTreeMap, HashMap};

pub fn identify(
    profiles: &BTreeMap<String, WalletProfile>,
    identities: &HashMap<String, IdentitySignals>,
    config: &AnalysisConfig,
    as_of: DateTime<Utc>,
) -> Vec<String> {
    profiles
        .values()
        .filter(|p| is_dead_end(p, identities.get(&p.address), config, as_of))
        .map(|p| p.address.clone())
        .collect()
}

fn is_dead_end(
    profile: &WalletProfile,
    identity: Option<&IdentitySignals>,
    config: &AnalysisConfig,
    as_of: DateTime<Utc>,
) -> bool {
    let inactive = match profile.last_active {
        Some(last) => (as_of - last).num_days() > config.dormancy_days,
        None => true,
    };

    let has_identity = identity.map(|i| i.signal_count() > 0).unwrap_or(false);

    inactive
        && profile.total_transactions <= 1
        && !profile.nft_activity_outside_artist
        && !has_identity
}
