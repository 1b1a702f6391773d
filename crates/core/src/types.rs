//! Rewards program domain types — redemption records, derived metrics,
//! user segments, and the filter criteria threaded through every view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Source Columns ─────────────────────────────────────────────────────────

pub const COL_MEMBER: &str = "Member_Name_Surname_Per_Redemption";
pub const COL_BRAND: &str = "Brand";
pub const COL_REWARD: &str = "Reward_Received";
pub const COL_DATE: &str = "Date_of_Redemption";
pub const COL_REDEMPTIONS: &str = "Redemptions_by_User";
pub const COL_SATISFACTION: &str = "Satisfaction_Rating_on_Reward";
pub const COL_REWARD_VALUE: &str = "Reward_Value_Amount_in_Dollars";
pub const COL_POINT_VALUE: &str = "Point_Value_per_Redemption";
pub const COL_COST: &str = "Cost_Per_Redemption_in_Dollars";

/// Maps the pipeline's logical fields onto the actual header names of a
/// source file. Defaults to the canonical rewards export headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_member_column")]
    pub member: String,
    #[serde(default = "default_brand_column")]
    pub brand: String,
    #[serde(default = "default_reward_column")]
    pub reward: String,
    #[serde(default = "default_date_column")]
    pub date: String,
    #[serde(default = "default_redemptions_column")]
    pub redemptions: String,
    #[serde(default = "default_satisfaction_column")]
    pub satisfaction: String,
    #[serde(default = "default_reward_value_column")]
    pub reward_value: String,
    #[serde(default = "default_point_value_column")]
    pub point_value: String,
    #[serde(default = "default_cost_column")]
    pub cost: String,
}

fn default_member_column() -> String {
    COL_MEMBER.to_string()
}
fn default_brand_column() -> String {
    COL_BRAND.to_string()
}
fn default_reward_column() -> String {
    COL_REWARD.to_string()
}
fn default_date_column() -> String {
    COL_DATE.to_string()
}
fn default_redemptions_column() -> String {
    COL_REDEMPTIONS.to_string()
}
fn default_satisfaction_column() -> String {
    COL_SATISFACTION.to_string()
}
fn default_reward_value_column() -> String {
    COL_REWARD_VALUE.to_string()
}
fn default_point_value_column() -> String {
    COL_POINT_VALUE.to_string()
}
fn default_cost_column() -> String {
    COL_COST.to_string()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            member: default_member_column(),
            brand: default_brand_column(),
            reward: default_reward_column(),
            date: default_date_column(),
            redemptions: default_redemptions_column(),
            satisfaction: default_satisfaction_column(),
            reward_value: default_reward_value_column(),
            point_value: default_point_value_column(),
            cost: default_cost_column(),
        }
    }
}

impl ColumnMapping {
    /// All mapped header names, in canonical column order.
    pub fn required_headers(&self) -> [&str; 9] {
        [
            &self.member,
            &self.brand,
            &self.reward,
            &self.date,
            &self.redemptions,
            &self.satisfaction,
            &self.reward_value,
            &self.point_value,
            &self.cost,
        ]
    }
}

// ─── Redemption Record ──────────────────────────────────────────────────────

/// One row of the source table: a single reward redemption by a member.
/// Rows carry no primary key; the table is an unordered multiset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub member: String,
    pub brand: String,
    pub reward: String,
    pub redeemed_on: NaiveDate,
    pub redemptions: u32,
    pub satisfaction: f64,
    pub reward_value: f64,
    pub point_value: f64,
    pub cost_per_redemption: f64,
}

// ─── User Segment ───────────────────────────────────────────────────────────

/// Categorical engagement tier assigned to each row by a segmentation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserSegment {
    #[serde(rename = "High Value")]
    HighValue,
    #[serde(rename = "Medium Value")]
    MediumValue,
    #[serde(rename = "Low Value")]
    LowValue,
}

impl UserSegment {
    pub const ALL: [UserSegment; 3] = [
        UserSegment::HighValue,
        UserSegment::MediumValue,
        UserSegment::LowValue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UserSegment::HighValue => "High Value",
            UserSegment::MediumValue => "Medium Value",
            UserSegment::LowValue => "Low Value",
        }
    }
}

impl std::fmt::Display for UserSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for UserSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High Value" | "high-value" => Ok(UserSegment::HighValue),
            "Medium Value" | "medium-value" => Ok(UserSegment::MediumValue),
            "Low Value" | "low-value" => Ok(UserSegment::LowValue),
            other => Err(format!("unknown user segment: {}", other)),
        }
    }
}

// ─── Enriched Record ────────────────────────────────────────────────────────

/// A source row plus its derived columns. Derivation never mutates the
/// source record and is recomputed on every pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: RedemptionRecord,
    /// `redemptions * satisfaction`.
    pub engagement_score: f64,
    /// `reward_value / point_value`; None when the point value is zero.
    pub efficiency: Option<f64>,
    pub segment: UserSegment,
}

// ─── Filter Criteria ────────────────────────────────────────────────────────

/// Explicit filter selections passed into view computation. `None` means
/// unconstrained; an empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub brands: Option<Vec<String>>,
    pub segments: Option<Vec<UserSegment>>,
}

impl FilterCriteria {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    pub fn segments<I>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = UserSegment>,
    {
        self.segments = Some(segments.into_iter().collect());
        self
    }

    /// Whether an enriched row passes every active criterion.
    pub fn matches(&self, row: &EnrichedRecord) -> bool {
        if let Some(start) = self.start_date {
            if row.record.redeemed_on < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if row.record.redeemed_on > end {
                return false;
            }
        }
        if let Some(brands) = &self.brands {
            if !brands.iter().any(|b| b == &row.record.brand) {
                return false;
            }
        }
        if let Some(segments) = &self.segments {
            if !segments.contains(&row.segment) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(brand: &str, segment: UserSegment, date: &str) -> EnrichedRecord {
        EnrichedRecord {
            record: RedemptionRecord {
                member: "Dana Voss".into(),
                brand: brand.into(),
                reward: "Gift Card".into(),
                redeemed_on: date.parse().unwrap(),
                redemptions: 3,
                satisfaction: 4.0,
                reward_value: 25.0,
                point_value: 100.0,
                cost_per_redemption: 5.0,
            },
            engagement_score: 12.0,
            efficiency: Some(0.25),
            segment,
        }
    }

    #[test]
    fn test_unfiltered_matches_everything() {
        let row = make_row("Acme", UserSegment::LowValue, "2024-03-01");
        assert!(FilterCriteria::unfiltered().matches(&row));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let row = make_row("Acme", UserSegment::LowValue, "2024-03-01");
        let criteria = FilterCriteria::unfiltered()
            .date_range("2024-03-01".parse().unwrap(), "2024-03-01".parse().unwrap());
        assert!(criteria.matches(&row));

        let earlier = FilterCriteria::unfiltered()
            .date_range("2024-03-02".parse().unwrap(), "2024-03-09".parse().unwrap());
        assert!(!earlier.matches(&row));
    }

    #[test]
    fn test_brand_and_segment_lists() {
        let row = make_row("Acme", UserSegment::MediumValue, "2024-03-01");
        let criteria = FilterCriteria::unfiltered()
            .brands(["Acme", "Globex"])
            .segments([UserSegment::MediumValue]);
        assert!(criteria.matches(&row));

        let wrong_segment =
            FilterCriteria::unfiltered().segments([UserSegment::HighValue]);
        assert!(!wrong_segment.matches(&row));
    }

    #[test]
    fn test_empty_brand_list_matches_nothing() {
        let row = make_row("Acme", UserSegment::LowValue, "2024-03-01");
        let criteria = FilterCriteria::unfiltered().brands(Vec::<String>::new());
        assert!(!criteria.matches(&row));
    }

    #[test]
    fn test_segment_labels_round_trip() {
        for segment in UserSegment::ALL {
            let parsed: UserSegment = segment.label().parse().unwrap();
            assert_eq!(parsed, segment);
        }
        let json = serde_json::to_string(&UserSegment::HighValue).unwrap();
        assert_eq!(json, "\"High Value\"");
    }
}
