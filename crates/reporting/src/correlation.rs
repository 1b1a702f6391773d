//! Pairwise Pearson correlation over the five numeric input columns.

use serde::{Deserialize, Serialize};

use rewards_core::types::{
    EnrichedRecord, RedemptionRecord, COL_COST, COL_POINT_VALUE, COL_REDEMPTIONS,
    COL_REWARD_VALUE, COL_SATISFACTION,
};

/// The numeric source columns the correlation matrix covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Redemptions,
    Satisfaction,
    RewardValue,
    PointValue,
    CostPerRedemption,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 5] = [
        NumericColumn::Redemptions,
        NumericColumn::Satisfaction,
        NumericColumn::RewardValue,
        NumericColumn::PointValue,
        NumericColumn::CostPerRedemption,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NumericColumn::Redemptions => COL_REDEMPTIONS,
            NumericColumn::Satisfaction => COL_SATISFACTION,
            NumericColumn::RewardValue => COL_REWARD_VALUE,
            NumericColumn::PointValue => COL_POINT_VALUE,
            NumericColumn::CostPerRedemption => COL_COST,
        }
    }

    fn extract(&self, record: &RedemptionRecord) -> f64 {
        match self {
            NumericColumn::Redemptions => f64::from(record.redemptions),
            NumericColumn::Satisfaction => record.satisfaction,
            NumericColumn::RewardValue => record.reward_value,
            NumericColumn::PointValue => record.point_value,
            NumericColumn::CostPerRedemption => record.cost_per_redemption,
        }
    }
}

/// Symmetric 5x5 correlation matrix. Degenerate (zero-variance) columns
/// produce NaN entries, including on the diagonal, matching the usual
/// statistical convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn compute(rows: &[EnrichedRecord]) -> Self {
        let series: Vec<Vec<f64>> = NumericColumn::ALL
            .iter()
            .map(|col| rows.iter().map(|r| col.extract(&r.record)).collect())
            .collect();

        let n = NumericColumn::ALL.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&series[i], &series[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            columns: NumericColumn::ALL.iter().map(|c| c.label().to_string()).collect(),
            values,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    covariance / denominator
}
