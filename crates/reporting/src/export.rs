//! CSV export of a filtered enriched table, derived columns included.

use anyhow::anyhow;
use tracing::info;

use rewards_core::types::{
    EnrichedRecord, COL_BRAND, COL_COST, COL_DATE, COL_MEMBER, COL_POINT_VALUE, COL_REDEMPTIONS,
    COL_REWARD, COL_REWARD_VALUE, COL_SATISFACTION,
};
use rewards_core::{RewardsError, RewardsResult};

const DERIVED_HEADERS: [&str; 3] = ["Engagement_Score", "Efficiency", "User_Segment"];

/// Serialize rows to delimited text: the nine source columns followed by
/// the derived columns. A null efficiency becomes an empty field.
pub fn to_csv(rows: &[EnrichedRecord]) -> RewardsResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        COL_MEMBER,
        COL_BRAND,
        COL_REWARD,
        COL_DATE,
        COL_REDEMPTIONS,
        COL_SATISFACTION,
        COL_REWARD_VALUE,
        COL_POINT_VALUE,
        COL_COST,
        DERIVED_HEADERS[0],
        DERIVED_HEADERS[1],
        DERIVED_HEADERS[2],
    ])?;

    for row in rows {
        let record = &row.record;
        let fields: [String; 12] = [
            record.member.clone(),
            record.brand.clone(),
            record.reward.clone(),
            record.redeemed_on.format("%Y-%m-%d").to_string(),
            record.redemptions.to_string(),
            record.satisfaction.to_string(),
            record.reward_value.to_string(),
            record.point_value.to_string(),
            record.cost_per_redemption.to_string(),
            row.engagement_score.to_string(),
            row.efficiency.map(|e| e.to_string()).unwrap_or_default(),
            row.segment.label().to_string(),
        ];
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RewardsError::Internal(anyhow!("flushing csv export: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| RewardsError::Internal(anyhow!("csv export was not utf-8: {}", e)))?;
    info!(rows = rows.len(), bytes = text.len(), "exported enriched table");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rewards_core::types::{RedemptionRecord, UserSegment};

    fn make_row(member: &str, efficiency: Option<f64>) -> EnrichedRecord {
        EnrichedRecord {
            record: RedemptionRecord {
                member: member.into(),
                brand: "Acme".into(),
                reward: "Gift Card".into(),
                redeemed_on: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                redemptions: 7,
                satisfaction: 4.5,
                reward_value: 25.0,
                point_value: 500.0,
                cost_per_redemption: 3.1,
            },
            engagement_score: 31.5,
            efficiency,
            segment: UserSegment::HighValue,
        }
    }

    #[test]
    fn test_header_carries_source_and_derived_columns() {
        let csv = to_csv(&[make_row("Ada Byrne", Some(0.05))]).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("Member_Name_Surname_Per_Redemption,"));
        assert!(header.ends_with("Engagement_Score,Efficiency,User_Segment"));
    }

    #[test]
    fn test_row_values() {
        let csv = to_csv(&[make_row("Ada Byrne", Some(0.05))]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2024-03-15"));
        assert!(row.contains("31.5"));
        assert!(row.ends_with("High Value"));
    }

    #[test]
    fn test_null_efficiency_is_empty_field() {
        let csv = to_csv(&[make_row("Ada Byrne", None)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",31.5,,High Value"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let csv = to_csv(&[make_row("Byrne, Ada", Some(0.05))]).unwrap();
        assert!(csv.contains("\"Byrne, Ada\""));
    }

    #[test]
    fn test_empty_table_exports_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
