//! Derived-metric calculator — row-wise engagement and efficiency, applied
//! without mutating the source records.

use tracing::debug;

use rewards_core::types::{EnrichedRecord, RedemptionRecord};

use crate::policy::SegmentPolicy;

/// `redemptions * satisfaction`. Zero when either factor is zero.
pub fn engagement_score(record: &RedemptionRecord) -> f64 {
    f64::from(record.redemptions) * record.satisfaction
}

/// `reward_value / point_value`. A zero point value yields `None` rather
/// than raising; downstream means skip the missing value.
pub fn efficiency(record: &RedemptionRecord) -> Option<f64> {
    if record.point_value == 0.0 {
        return None;
    }
    Some(record.reward_value / record.point_value)
}

/// Build the enriched table: derived columns plus the segment assigned by
/// the given policy. Output preserves input order.
pub fn enrich(records: &[RedemptionRecord], policy: SegmentPolicy) -> Vec<EnrichedRecord> {
    let segments = policy.assign(records);
    let enriched: Vec<EnrichedRecord> = records
        .iter()
        .zip(segments)
        .map(|(record, segment)| EnrichedRecord {
            record: record.clone(),
            engagement_score: engagement_score(record),
            efficiency: efficiency(record),
            segment,
        })
        .collect();
    debug!(rows = enriched.len(), "computed derived metrics");
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rewards_core::types::UserSegment;

    fn make_record(
        redemptions: u32,
        satisfaction: f64,
        reward_value: f64,
        point_value: f64,
    ) -> RedemptionRecord {
        RedemptionRecord {
            member: "Iris Kahn".into(),
            brand: "Globex".into(),
            reward: "Headphones".into(),
            redeemed_on: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            redemptions,
            satisfaction,
            reward_value,
            point_value,
            cost_per_redemption: 4.0,
        }
    }

    #[test]
    fn test_engagement_is_the_product() {
        let record = make_record(7, 4.5, 25.0, 500.0);
        assert!((engagement_score(&record) - 31.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engagement_zero_factor() {
        assert!((engagement_score(&make_record(0, 4.5, 25.0, 500.0))).abs() < f64::EPSILON);
        assert!((engagement_score(&make_record(7, 0.0, 25.0, 500.0))).abs() < f64::EPSILON);
    }

    #[test]
    fn test_efficiency_is_the_quotient() {
        let record = make_record(3, 3.0, 25.0, 500.0);
        assert!((efficiency(&record).unwrap() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_point_value_never_panics() {
        let record = make_record(3, 3.0, 25.0, 0.0);
        assert_eq!(efficiency(&record), None);
    }

    #[test]
    fn test_enrich_preserves_order_and_source_fields() {
        let records = vec![
            make_record(8, 4.5, 25.0, 500.0),
            make_record(2, 2.0, 10.0, 0.0),
        ];
        let enriched = enrich(&records, SegmentPolicy::FixedThreshold);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].record, records[0]);
        assert_eq!(enriched[0].segment, UserSegment::HighValue);
        assert!((enriched[0].engagement_score - 36.0).abs() < f64::EPSILON);
        assert_eq!(enriched[1].efficiency, None);
        assert_eq!(enriched[1].segment, UserSegment::LowValue);
    }

    #[test]
    fn test_enrich_empty_table() {
        assert!(enrich(&[], SegmentPolicy::FixedThreshold).is_empty());
    }
}
