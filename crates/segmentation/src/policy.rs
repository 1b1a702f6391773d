//! Segmentation policies — two distinct strategies for assigning a
//! [`UserSegment`] to each row. The fixed-threshold policy is an absolute,
//! per-row classification; the tertile policy is population-relative and
//! buckets on redemption count alone. They are deliberately separate and
//! never blended.

use serde::{Deserialize, Serialize};
use tracing::debug;

use rewards_core::types::{RedemptionRecord, UserSegment};

/// Named segmentation strategy, selected explicitly by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// Absolute thresholds on redemption count and satisfaction rating.
    #[default]
    FixedThreshold,
    /// Equal-population tertiles of redemption count; satisfaction is
    /// not consulted.
    RedemptionTertiles,
}

impl SegmentPolicy {
    /// Assign one segment per record, in input order.
    pub fn assign(&self, records: &[RedemptionRecord]) -> Vec<UserSegment> {
        let segments = match self {
            SegmentPolicy::FixedThreshold => records
                .iter()
                .map(|r| classify_fixed(r.redemptions, r.satisfaction))
                .collect(),
            SegmentPolicy::RedemptionTertiles => assign_tertiles(records),
        };
        debug!(policy = ?self, rows = records.len(), "assigned user segments");
        segments
    }
}

/// Fixed-threshold classification. Pure function of exactly the two
/// inputs; total on the domain.
pub fn classify_fixed(redemptions: u32, satisfaction: f64) -> UserSegment {
    if redemptions >= 7 && satisfaction >= 4.0 {
        UserSegment::HighValue
    } else if redemptions >= 5 || satisfaction >= 3.5 {
        UserSegment::MediumValue
    } else {
        UserSegment::LowValue
    }
}

/// Population-relative tertiles of redemption count. Cut points are the
/// 1/3 and 2/3 quantiles (linear interpolation); buckets are closed on
/// the right, so assignment stays total even when the cuts coincide.
fn assign_tertiles(records: &[RedemptionRecord]) -> Vec<UserSegment> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts: Vec<f64> = records.iter().map(|r| f64::from(r.redemptions)).collect();
    counts.sort_by(|a, b| a.total_cmp(b));
    let lower_cut = quantile(&counts, 1.0 / 3.0);
    let upper_cut = quantile(&counts, 2.0 / 3.0);

    records
        .iter()
        .map(|r| {
            let count = f64::from(r.redemptions);
            if count <= lower_cut {
                UserSegment::LowValue
            } else if count <= upper_cut {
                UserSegment::MediumValue
            } else {
                UserSegment::HighValue
            }
        })
        .collect()
}

/// Quantile of a non-empty sorted slice, interpolating linearly between
/// order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}
