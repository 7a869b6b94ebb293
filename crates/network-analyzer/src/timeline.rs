//! Timeline pattern classification.
//!
//! Buckets transfer counts by calendar month (through the analysis
//! time, so trailing silence is visible) and classifies the temporal
//! shape: organic, growing, declining, or burst-then-silence.

use chrono::{DateTime, Datelike, Utc};
use provenance_core::types::{ActivityPattern, TransferRecord};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub transfers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineReport {
    pub pattern: ActivityPattern,
    /// 0-100; only meaningful for the organic pattern.
    pub consistency: f64,
    /// Timeline health score, 0-100.
    pub score: f64,
    pub monthly_counts: Vec<MonthlyCount>,
}

impl TimelineReport {
    fn flat(pattern: ActivityPattern, monthly_counts: Vec<MonthlyCount>) -> Self {
        Self {
            pattern,
            consistency: 0.0,
            score: 50.0,
            monthly_counts,
        }
    }
}

/// Classify the temporal shape of the creator's transfer activity.
///
/// Months between the first timestamped transfer and `as_of` with no
/// activity count as zero, so a burst followed by silence reads as
/// `[n, n, n, 0, 0, 0]` rather than a short healthy series.
pub fn analyze(transfers: &[TransferRecord], as_of: DateTime<Utc>) -> TimelineReport {
    let mut by_month: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for t in transfers {
        if let Some(ts) = t.timestamp {
            *by_month.entry((ts.year(), ts.month())).or_default() += 1;
        }
    }

    let Some((&first_month, _)) = by_month.first_key_value() else {
        return TimelineReport::flat(ActivityPattern::NoData, Vec::new());
    };

    let end_month = (as_of.year(), as_of.month()).max(*by_month.last_key_value().map(|(k, _)| k).unwrap_or(&first_month));
    let monthly_counts = fill_months(first_month, end_month, &by_month);
    let counts: Vec<f64> = monthly_counts.iter().map(|m| m.transfers as f64).collect();

    if counts.len() < 3 {
        return TimelineReport::flat(ActivityPattern::LimitedData, monthly_counts);
    }

    let quarter = (counts.len() / 4).max(1);
    let first_mean = counts[..quarter].iter().sum::<f64>() / quarter as f64;
    let last_mean = counts[counts.len() - quarter..].iter().sum::<f64>() / quarter as f64;

    let (pattern, consistency, score) = if first_mean > 0.0 && last_mean == 0.0 {
        (ActivityPattern::BurstSilence, 0.0, 25.0)
    } else if first_mean > 5.0 * last_mean {
        (ActivityPattern::Declining, 0.0, 45.0)
    } else if last_mean > first_mean {
        (ActivityPattern::Growing, 0.0, 85.0)
    } else {
        let mean = counts.iter().mean();
        let std_dev = counts.iter().std_dev();
        let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };
        let consistency = (100.0 - 50.0 * cv).max(0.0);
        (
            ActivityPattern::Organic,
            consistency,
            50.0 + consistency / 2.0,
        )
    };

    TimelineReport {
        pattern,
        consistency,
        score,
        monthly_counts,
    }
}

fn fill_months(
    start: (i32, u32),
    end: (i32, u32),
    by_month: &BTreeMap<(i32, u32), u64>,
) -> Vec<MonthlyCount> {
    let mut months = Vec::new();
    let (mut year, mut month) = start;
    loop {
        months.push(MonthlyCount {
            month: format!("{year:04}-{month:02}"),
            transfers: by_month.get(&(year, month)).copied().unwrap_or(0),
        });
        if (year, month) >= end {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn in_month(year: i32, month: u32, count: usize) -> Vec<TransferRecord> {
        (0..count)
            .map(|i| TransferRecord {
                token_id: format!("{year}-{month}-{i}"),
                artist: "0xartist".into(),
                from: "0xa".into(),
                to: "0xb".into(),
                amount: 1,
                value: Decimal::ONE,
                timestamp: Some(
                    Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0).unwrap()
                        + chrono::Duration::hours(i as i64),
                ),
            })
            .collect()
    }

    fn series(counts: &[usize]) -> Vec<TransferRecord> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(i, &c)| in_month(2026, i as u32 + 1, c))
            .collect()
    }

    fn end_of(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, 28, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_burst_then_silence() {
        // Activity in Jan-Mar, nothing through June.
        let transfers = series(&[10, 8, 9]);
        let report = analyze(&transfers, end_of(6));

        assert_eq!(report.pattern, ActivityPattern::BurstSilence);
        assert!(report.score <= 30.0);
        assert_eq!(report.monthly_counts.len(), 6);
        assert_eq!(report.monthly_counts[3].transfers, 0);
    }

    #[test]
    fn test_growing_series() {
        let transfers = series(&[2, 3, 5, 8, 12]);
        let report = analyze(&transfers, end_of(5));

        assert_eq!(report.pattern, ActivityPattern::Growing);
        assert!(report.score >= 70.0);
    }

    #[test]
    fn test_declining_series() {
        let transfers = series(&[30, 20, 10, 2, 1, 1]);
        let report = analyze(&transfers, end_of(6));

        assert_eq!(report.pattern, ActivityPattern::Declining);
        assert!((report.score - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_steady_series_is_organic_and_consistent() {
        let transfers = series(&[5, 5, 6, 5, 6, 5]);
        let report = analyze(&transfers, end_of(6));

        assert_eq!(report.pattern, ActivityPattern::Organic);
        assert!(report.consistency > 90.0);
        assert!(report.score > 70.0);
    }

    #[test]
    fn test_short_history_is_limited_data() {
        let transfers = series(&[4, 6]);
        let report = analyze(&transfers, end_of(2));

        assert_eq!(report.pattern, ActivityPattern::LimitedData);
        assert!((report.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_timestamps_is_no_data() {
        let mut transfers = series(&[4]);
        for t in &mut transfers {
            t.timestamp = None;
        }
        let report = analyze(&transfers, end_of(6));

        assert_eq!(report.pattern, ActivityPattern::NoData);
        assert!((report.score - 50.0).abs() < 1e-9);
        assert!(report.monthly_counts.is_empty());
    }

    #[test]
    fn test_interior_gap_months_count_as_zero() {
        let mut transfers = in_month(2026, 1, 3);
        transfers.extend(in_month(2026, 4, 3));
        let report = analyze(&transfers, end_of(4));

        assert_eq!(report.monthly_counts.len(), 4);
        assert_eq!(report.monthly_counts[1].transfers, 0);
        assert_eq!(report.monthly_counts[2].transfers, 0);
    }
}
