//! The single synchronous entry point for the presentation layer: apply
//! filter criteria, compute every aggregation view, hand back one value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use rewards_core::types::{EnrichedRecord, FilterCriteria};

use crate::correlation::CorrelationMatrix;
use crate::views::{
    brand_efficiency, brand_performance, engagement_distribution, program_overview,
    reward_popularity, segment_summary, BrandEfficiency, BrandPerformance, EngagementBucket,
    ProgramOverview, RewardPopularity, SegmentSummary,
};

/// Every view over one filtered snapshot of the enriched table. Recomputed
/// from scratch whenever the filters change; no state is carried between
/// computations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub criteria: FilterCriteria,
    pub matching_rows: u64,
    pub overview: ProgramOverview,
    pub engagement_distribution: Vec<EngagementBucket>,
    pub brand_efficiency: Vec<BrandEfficiency>,
    pub segment_summary: Vec<SegmentSummary>,
    pub reward_popularity: Vec<RewardPopularity>,
    pub brand_performance: Vec<BrandPerformance>,
    pub correlation: CorrelationMatrix,
    pub generated_at: DateTime<Utc>,
}

impl ViewSnapshot {
    /// Compute all views over the rows passing `criteria`. An empty match
    /// produces empty views, never an error.
    pub fn compute(rows: &[EnrichedRecord], criteria: &FilterCriteria) -> Self {
        let filtered = apply_criteria(rows, criteria);
        info!(
            total_rows = rows.len(),
            matching_rows = filtered.len(),
            "computed view snapshot"
        );
        Self {
            criteria: criteria.clone(),
            matching_rows: filtered.len() as u64,
            overview: program_overview(&filtered),
            engagement_distribution: engagement_distribution(&filtered),
            brand_efficiency: brand_efficiency(&filtered),
            segment_summary: segment_summary(&filtered),
            reward_popularity: reward_popularity(&filtered),
            brand_performance: brand_performance(&filtered),
            correlation: CorrelationMatrix::compute(&filtered),
            generated_at: Utc::now(),
        }
    }
}

/// Rows passing every active criterion, in input order.
pub fn apply_criteria(rows: &[EnrichedRecord], criteria: &FilterCriteria) -> Vec<EnrichedRecord> {
    rows.iter().filter(|r| criteria.matches(r)).cloned().collect()
}
