//! Wash-trade classification.
//!
//! Classifies each secondary transfer as suspicious or legitimate
//! based on the buyer's behavioral profile, and splits total volume
//! accordingly. A transfer may carry several reasons but counts as a
//! single indicator.

use provenance_core::types::{TransferRecord, WalletProfile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Why a transfer was classified as suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashReason {
    LowVitalityBuyer,
    SingleArtistBuyer,
    RapidResaleBuyer,
    HeavilyFlaggedBuyer,
}

/// One flagged transfer with its classification reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousTransfer {
    pub from: String,
    pub to: String,
    pub value: Decimal,
    pub reasons: Vec<WashReason>,
}

/// Aggregate wash-trade classification for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WashTradeReport {
    /// Number of suspicious transfers (one per transfer, regardless of
    /// how many reasons apply).
    pub indicator_count: u64,
    pub suspicious_volume: Decimal,
    pub legitimate_volume: Decimal,
    pub suspicious_transfers: Vec<SuspiciousTransfer>,
}

impl WashTradeReport {
    pub fn total_volume(&self) -> Decimal {
        self.suspicious_volume + self.legitimate_volume
    }
}

/// Classify every secondary transfer against the buyer's profile.
/// Mints and burns are skipped; buyers without a profile are treated
/// as legitimate (missing data stays neutral).
pub fn analyze(
    transfers: &[TransferRecord],
    profiles: &BTreeMap<String, WalletProfile>,
) -> WashTradeReport {
    let mut report = WashTradeReport::default();

    for t in transfers {
        if !t.is_secondary() {
            continue;
        }
        let reasons = profiles
            .get(&t.to)
            .map(|buyer| classify_buyer(buyer))
            .unwrap_or_default();

        if reasons.is_empty() {
            report.legitimate_volume += t.value;
        } else {
            report.indicator_count += 1;
            report.suspicious_volume += t.value;
            report.suspicious_transfers.push(SuspiciousTransfer {
                from: t.from.clone(),
                to: t.to.clone(),
                value: t.value,
                reasons,
            });
        }
    }

    debug!(
        indicators = report.indicator_count,
        suspicious_volume = %report.suspicious_volume,
        legitimate_volume = %report.legitimate_volume,
        "Wash-trade classification complete"
    );
    report
}

fn classify_buyer(buyer: &WalletProfile) -> Vec<WashReason> {
    let mut reasons = Vec::new();

    if buyer.vitality_score < 30.0 {
        reasons.push(WashReason::LowVitalityBuyer);
    }
    if buyer.single_artist_ratio > 0.95 {
        reasons.push(WashReason::SingleArtistBuyer);
    }
    // Zero hold time means no matched pairs, not a fast flip.
    if buyer.avg_hold_time_days > 0.0 && buyer.avg_hold_time_days < 1.0 {
        reasons.push(WashReason::RapidResaleBuyer);
    }
    if buyer.suspicion_flags.len() >= 3 {
        reasons.push(WashReason::HeavilyFlaggedBuyer);
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenance_core::types::{SuspicionFlag, NULL_ADDRESS};

    fn transfer(from: &str, to: &str, value: i64) -> TransferRecord {
        TransferRecord {
            token_id: "1".into(),
            artist: "0xartist".into(),
            from: from.into(),
            to: to.into(),
            amount: 1,
            value: Decimal::new(value, 0),
            timestamp: None,
        }
    }

    fn buyer(address: &str, vitality: f64, ratio: f64) -> WalletProfile {
        WalletProfile {
            address: address.into(),
            first_seen: None,
            last_active: None,
            total_transactions: 10,
            unique_artists_collected: 3,
            nft_activity_outside_artist: true,
            single_artist_ratio: ratio,
            avg_hold_time_days: 30.0,
            immediate_flip_count: 0,
            vitality_score: vitality,
            suspicion_flags: Default::default(),
        }
    }

    fn profiles_of(list: Vec<WalletProfile>) -> BTreeMap<String, WalletProfile> {
        list.into_iter().map(|p| (p.address.clone(), p)).collect()
    }

    #[test]
    fn test_hollow_buyer_flags_transfer() {
        let profiles = profiles_of(vec![buyer("0xhollow", 10.0, 1.0)]);
        let report = analyze(&[transfer("0xseller", "0xhollow", 100)], &profiles);

        assert_eq!(report.indicator_count, 1);
        assert_eq!(report.suspicious_volume, Decimal::new(100, 0));
        assert_eq!(report.legitimate_volume, Decimal::ZERO);
        let reasons = &report.suspicious_transfers[0].reasons;
        assert!(reasons.contains(&WashReason::LowVitalityBuyer));
        assert!(reasons.contains(&WashReason::SingleArtistBuyer));
    }

    #[test]
    fn test_healthy_buyer_is_legitimate() {
        let profiles = profiles_of(vec![buyer("0xgood", 90.0, 0.2)]);
        let report = analyze(&[transfer("0xseller", "0xgood", 100)], &profiles);

        assert_eq!(report.indicator_count, 0);
        assert_eq!(report.legitimate_volume, Decimal::new(100, 0));
        assert!(report.suspicious_transfers.is_empty());
    }

    #[test]
    fn test_multiple_reasons_count_once() {
        let mut hollow = buyer("0xhollow", 10.0, 1.0);
        hollow.avg_hold_time_days = 0.1;
        hollow.suspicion_flags = [
            SuspicionFlag::SingleArtistCollector,
            SuspicionFlag::VeryShortHoldTimes,
            SuspicionFlag::MinimalActivity,
        ]
        .into_iter()
        .collect();

        let profiles = profiles_of(vec![hollow]);
        let report = analyze(&[transfer("0xseller", "0xhollow", 50)], &profiles);

        assert_eq!(report.indicator_count, 1);
        assert_eq!(report.suspicious_transfers[0].reasons.len(), 4);
    }

    #[test]
    fn test_mints_and_burns_skipped() {
        let profiles = profiles_of(vec![buyer("0xhollow", 10.0, 1.0)]);
        let report = analyze(
            &[
                transfer(NULL_ADDRESS, "0xhollow", 100),
                transfer("0xhollow", NULL_ADDRESS, 100),
            ],
            &profiles,
        );

        assert_eq!(report.indicator_count, 0);
        assert_eq!(report.total_volume(), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_buyer_stays_neutral() {
        let report = analyze(&[transfer("0xseller", "0xmystery", 40)], &BTreeMap::new());

        assert_eq!(report.indicator_count, 0);
        assert_eq!(report.legitimate_volume, Decimal::new(40, 0));
    }
}
