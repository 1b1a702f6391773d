//! Aggregation views over the enriched table. Every view is a pure,
//! read-only summarization: empty input produces an empty (or zeroed)
//! result, never an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use rewards_core::types::{EnrichedRecord, UserSegment};

// ─── Brand Efficiency ───────────────────────────────────────────────────────

/// Mean reward efficiency for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandEfficiency {
    pub brand: String,
    pub mean_efficiency: f64,
    /// Rows that contributed a value; zero-point-value rows are excluded.
    pub samples: u64,
}

/// Group-by-brand mean efficiency, sorted descending. The sort is stable,
/// so ties keep first-seen input order. Brands whose every row lacks an
/// efficiency value are omitted.
pub fn brand_efficiency(rows: &[EnrichedRecord]) -> Vec<BrandEfficiency> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, u64)> = HashMap::new();

    for row in rows {
        let entry = sums.entry(row.record.brand.clone()).or_insert_with(|| {
            order.push(row.record.brand.clone());
            (0.0, 0)
        });
        if let Some(value) = row.efficiency {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let mut result: Vec<BrandEfficiency> = order
        .into_iter()
        .filter_map(|brand| {
            let (sum, count) = sums[&brand];
            if count == 0 {
                return None;
            }
            Some(BrandEfficiency {
                brand,
                mean_efficiency: sum / count as f64,
                samples: count,
            })
        })
        .collect();
    result.sort_by(|a, b| b.mean_efficiency.total_cmp(&a.mean_efficiency));
    result
}

// ─── Segment Summary ────────────────────────────────────────────────────────

/// Per-segment means of the raw engagement inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment: UserSegment,
    pub rows: u64,
    pub mean_redemptions: f64,
    pub mean_satisfaction: f64,
    pub mean_reward_value: f64,
}

/// Group-by-segment means, ordered High → Medium → Low. Segments with no
/// rows are left out.
pub fn segment_summary(rows: &[EnrichedRecord]) -> Vec<SegmentSummary> {
    UserSegment::ALL
        .into_iter()
        .filter_map(|segment| {
            let members: Vec<&EnrichedRecord> =
                rows.iter().filter(|r| r.segment == segment).collect();
            if members.is_empty() {
                return None;
            }
            let n = members.len() as f64;
            Some(SegmentSummary {
                segment,
                rows: members.len() as u64,
                mean_redemptions: members
                    .iter()
                    .map(|r| f64::from(r.record.redemptions))
                    .sum::<f64>()
                    / n,
                mean_satisfaction: members.iter().map(|r| r.record.satisfaction).sum::<f64>() / n,
                mean_reward_value: members.iter().map(|r| r.record.reward_value).sum::<f64>() / n,
            })
        })
        .collect()
}

// ─── Reward Popularity ──────────────────────────────────────────────────────

/// Redemption count and mean satisfaction for one reward type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPopularity {
    pub reward: String,
    pub count: u64,
    pub mean_satisfaction: f64,
}

/// Group-by-reward-type popularity, sorted by count descending (stable,
/// first-seen order breaks ties).
pub fn reward_popularity(rows: &[EnrichedRecord]) -> Vec<RewardPopularity> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (u64, f64)> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.record.reward.clone()).or_insert_with(|| {
            order.push(row.record.reward.clone());
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += row.record.satisfaction;
    }

    let mut result: Vec<RewardPopularity> = order
        .into_iter()
        .map(|reward| {
            let (count, satisfaction_sum) = groups[&reward];
            RewardPopularity {
                reward,
                count,
                mean_satisfaction: satisfaction_sum / count as f64,
            }
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

// ─── Brand Performance ──────────────────────────────────────────────────────

/// Per-brand totals backing the performance overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandPerformance {
    pub brand: String,
    pub total_reward_value: f64,
    pub mean_satisfaction: f64,
    pub rows: u64,
}

/// Group-by-brand totals, in first-seen input order.
pub fn brand_performance(rows: &[EnrichedRecord]) -> Vec<BrandPerformance> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (f64, f64, u64)> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.record.brand.clone()).or_insert_with(|| {
            order.push(row.record.brand.clone());
            (0.0, 0.0, 0)
        });
        entry.0 += row.record.reward_value;
        entry.1 += row.record.satisfaction;
        entry.2 += 1;
    }

    order
        .into_iter()
        .map(|brand| {
            let (total_value, satisfaction_sum, count) = groups[&brand];
            BrandPerformance {
                brand,
                total_reward_value: total_value,
                mean_satisfaction: satisfaction_sum / count as f64,
                rows: count,
            }
        })
        .collect()
}

// ─── Program Overview ───────────────────────────────────────────────────────

/// Headline program metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOverview {
    pub total_members: u64,
    pub total_redemptions: u64,
    pub mean_satisfaction: f64,
    pub total_reward_value: f64,
}

pub fn program_overview(rows: &[EnrichedRecord]) -> ProgramOverview {
    let members: std::collections::HashSet<&str> =
        rows.iter().map(|r| r.record.member.as_str()).collect();
    let total_redemptions: u64 = rows.iter().map(|r| u64::from(r.record.redemptions)).sum();
    let satisfaction_sum: f64 = rows.iter().map(|r| r.record.satisfaction).sum();

    ProgramOverview {
        total_members: members.len() as u64,
        total_redemptions,
        mean_satisfaction: if rows.is_empty() {
            0.0
        } else {
            satisfaction_sum / rows.len() as f64
        },
        total_reward_value: rows.iter().map(|r| r.record.reward_value).sum(),
    }
}

// ─── Engagement Distribution ────────────────────────────────────────────────

/// Labels for the five equal-width engagement score bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementBand {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl EngagementBand {
    pub const ALL: [EngagementBand; 5] = [
        EngagementBand::VeryLow,
        EngagementBand::Low,
        EngagementBand::Medium,
        EngagementBand::High,
        EngagementBand::VeryHigh,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementBucket {
    pub band: EngagementBand,
    pub count: u64,
}

/// Counts per engagement band over five equal-width bins spanning the
/// observed score range. Bins are closed on the right, the lowest bin
/// includes the minimum. A constant score column puts every row in the
/// lowest band. Empty input yields an empty vec.
pub fn engagement_distribution(rows: &[EnrichedRecord]) -> Vec<EngagementBucket> {
    if rows.is_empty() {
        return Vec::new();
    }

    let min = rows
        .iter()
        .map(|r| r.engagement_score)
        .fold(f64::INFINITY, f64::min);
    let max = rows
        .iter()
        .map(|r| r.engagement_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / 5.0;

    let mut counts = [0u64; 5];
    for row in rows {
        let position = if width == 0.0 {
            0.0
        } else {
            (row.engagement_score - min) / width
        };
        // A score exactly on an interior edge belongs to the lower band.
        let index = if position <= 1.0 {
            0
        } else {
            (position.ceil() as usize - 1).min(4)
        };
        counts[index] += 1;
    }

    EngagementBand::ALL
        .into_iter()
        .zip(counts)
        .map(|(band, count)| EngagementBucket { band, count })
        .collect()
}
