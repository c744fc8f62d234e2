//! Recurring-charge detection over normalized-vendor expense groups.
//!
//! A vendor group recurs when its amounts cluster and its day-gaps either
//! land in a known cadence band or stay consistently close to their median.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tideover_core::Money;

/// Dollar slack for amount clustering; small bills jitter more than 20%.
const AMOUNT_TOLERANCE_FLOOR_CENTS: f64 = 1500.0;

/// Fraction of the group mean the amounts may wander.
const AMOUNT_TOLERANCE_RATIO: f64 = 0.20;

/// Fallback acceptance: this share of gaps within 25% of the median gap.
const GAP_CONSISTENCY_SHARE: f64 = 0.70;
const GAP_CONSISTENCY_SPREAD: f64 = 0.25;

/// Known billing cadences, as day-gap bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Annual,
}

impl Cadence {
    /// Classify an average day-gap against the bands. Gaps between bands
    /// (a 20-day cycle, say) belong to no cadence.
    pub fn from_gap(days: f64) -> Option<Cadence> {
        match days {
            d if (5.0..=9.0).contains(&d) => Some(Cadence::Weekly),
            d if (12.0..=16.0).contains(&d) => Some(Cadence::Biweekly),
            d if (25.0..=35.0).contains(&d) => Some(Cadence::Monthly),
            d if (55.0..=65.0).contains(&d) => Some(Cadence::Bimonthly),
            d if (85.0..=100.0).contains(&d) => Some(Cadence::Quarterly),
            d if (350.0..=380.0).contains(&d) => Some(Cadence::Annual),
            _ => None,
        }
    }
}

/// One candidate row: the caller's index plus the fields the detector needs.
#[derive(Debug, Clone)]
pub struct VendorGroupEntry {
    pub index: usize,
    pub date: NaiveDate,
    pub amount: Money,
    pub vendor_key: String,
}

/// Indices of entries that belong to a recurring vendor group.
///
/// Only expenses participate; income and singleton vendors never recur.
pub fn recurring_indices(entries: &[VendorGroupEntry]) -> HashSet<usize> {
    let mut groups: HashMap<&str, Vec<&VendorGroupEntry>> = HashMap::new();
    for entry in entries {
        if entry.amount.is_negative() && !entry.vendor_key.is_empty() {
            groups.entry(entry.vendor_key.as_str()).or_default().push(entry);
        }
    }

    let mut recurring = HashSet::new();
    for group in groups.values() {
        if group.len() >= 2 && group_recurs(group) {
            recurring.extend(group.iter().map(|e| e.index));
        }
    }
    recurring
}

fn group_recurs(group: &[&VendorGroupEntry]) -> bool {
    if !amounts_cluster(group) {
        return false;
    }

    let mut dates: Vec<NaiveDate> = group.iter().map(|e| e.date).collect();
    dates.sort();
    let gaps: Vec<f64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if Cadence::from_gap(mean_gap).is_some() {
        return true;
    }
    gaps_are_consistent(&gaps)
}

/// Every amount within max(20% of the mean, $15) of the group mean.
fn amounts_cluster(group: &[&VendorGroupEntry]) -> bool {
    let cents: Vec<f64> = group.iter().map(|e| e.amount.to_cents().abs() as f64).collect();
    let mean = cents.iter().sum::<f64>() / cents.len() as f64;
    let tolerance = (mean * AMOUNT_TOLERANCE_RATIO).max(AMOUNT_TOLERANCE_FLOOR_CENTS);
    cents.iter().all(|&c| (c - mean).abs() <= tolerance)
}

/// At least 70% of gaps within 25% of the median gap. Catches steady custom
/// cycles the bands don't name; a zero median (same-day duplicates) is noise.
fn gaps_are_consistent(gaps: &[f64]) -> bool {
    let median = median(gaps);
    if median <= 0.0 {
        return false;
    }
    let spread = median * GAP_CONSISTENCY_SPREAD;
    let close = gaps.iter().filter(|&&g| (g - median).abs() <= spread).count();
    close as f64 / gaps.len() as f64 >= GAP_CONSISTENCY_SHARE
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
