//! CSV record loader — validates the header row before touching any data,
//! then parses every row strictly. A single malformed value rejects the
//! whole load so downstream aggregates never run over a partial table.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use rewards_core::types::{ColumnMapping, RedemptionRecord};
use rewards_core::{RewardsError, RewardsResult};

const DEFAULT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Reads delimited redemption data into memory.
pub struct RecordLoader {
    columns: ColumnMapping,
    date_formats: Vec<String>,
}

impl RecordLoader {
    pub fn new() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Use non-canonical header names for the source file.
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> RewardsResult<Vec<RedemptionRecord>> {
        let file = std::fs::File::open(path.as_ref())?;
        let records = self.load_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            rows = records.len(),
            "loaded redemption records"
        );
        Ok(records)
    }

    /// Parse records from any reader. Header validation happens before any
    /// row is parsed; the first bad row aborts the load.
    pub fn load_reader<R: Read>(&self, reader: R) -> RewardsResult<Vec<RedemptionRecord>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let header = csv_reader.headers()?.clone();
        let index = ColumnIndex::resolve(&header, &self.columns)?;

        let mut records = Vec::new();
        for (i, row) in csv_reader.records().enumerate() {
            let row = row?;
            // Header is line 1.
            let line = i + 2;
            records.push(self.parse_row(&row, &index, line)?);
        }
        Ok(records)
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        index: &ColumnIndex,
        line: usize,
    ) -> RewardsResult<RedemptionRecord> {
        Ok(RedemptionRecord {
            member: field(row, index.member, &self.columns.member, line)?.to_string(),
            brand: field(row, index.brand, &self.columns.brand, line)?.to_string(),
            reward: field(row, index.reward, &self.columns.reward, line)?.to_string(),
            redeemed_on: self.parse_date(
                field(row, index.date, &self.columns.date, line)?,
                &self.columns.date,
                line,
            )?,
            redemptions: parse_count(
                field(row, index.redemptions, &self.columns.redemptions, line)?,
                &self.columns.redemptions,
                line,
            )?,
            satisfaction: parse_number(
                field(row, index.satisfaction, &self.columns.satisfaction, line)?,
                &self.columns.satisfaction,
                line,
            )?,
            reward_value: parse_number(
                field(row, index.reward_value, &self.columns.reward_value, line)?,
                &self.columns.reward_value,
                line,
            )?,
            point_value: parse_number(
                field(row, index.point_value, &self.columns.point_value, line)?,
                &self.columns.point_value,
                line,
            )?,
            cost_per_redemption: parse_number(
                field(row, index.cost, &self.columns.cost, line)?,
                &self.columns.cost,
                line,
            )?,
        })
    }

    fn parse_date(&self, value: &str, column: &str, line: usize) -> RewardsResult<NaiveDate> {
        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Ok(date);
            }
        }
        Err(RewardsError::Parse(format!(
            "unparseable date '{}' in column '{}' at line {}",
            value, column, line
        )))
    }
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new()
    }
}

struct ColumnIndex {
    member: usize,
    brand: usize,
    reward: usize,
    date: usize,
    redemptions: usize,
    satisfaction: usize,
    reward_value: usize,
    point_value: usize,
    cost: usize,
}

impl ColumnIndex {
    fn resolve(header: &csv::StringRecord, columns: &ColumnMapping) -> RewardsResult<Self> {
        let missing: Vec<&str> = columns
            .required_headers()
            .into_iter()
            .filter(|name| !header.iter().any(|h| h == *name))
            .collect();
        if !missing.is_empty() {
            return Err(RewardsError::Schema(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let position = |name: &str| header.iter().position(|h| h == name).unwrap_or(0);
        Ok(Self {
            member: position(&columns.member),
            brand: position(&columns.brand),
            reward: position(&columns.reward),
            date: position(&columns.date),
            redemptions: position(&columns.redemptions),
            satisfaction: position(&columns.satisfaction),
            reward_value: position(&columns.reward_value),
            point_value: position(&columns.point_value),
            cost: position(&columns.cost),
        })
    }
}

fn field<'a>(
    row: &'a csv::StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> RewardsResult<&'a str> {
    let value = row.get(idx).unwrap_or("").trim();
    if value.is_empty() {
        return Err(RewardsError::InvalidRecord(format!(
            "missing value for column '{}' at line {}",
            column, line
        )));
    }
    Ok(value)
}

fn parse_count(value: &str, column: &str, line: usize) -> RewardsResult<u32> {
    value.parse::<u32>().map_err(|_| {
        RewardsError::Parse(format!(
            "invalid count '{}' in column '{}' at line {}",
            value, column, line
        ))
    })
}

fn parse_number(value: &str, column: &str, line: usize) -> RewardsResult<f64> {
    let parsed = value.parse::<f64>().map_err(|_| {
        RewardsError::Parse(format!(
            "invalid number '{}' in column '{}' at line {}",
            value, column, line
        ))
    })?;
    if !parsed.is_finite() {
        return Err(RewardsError::InvalidRecord(format!(
            "non-finite value '{}' in column '{}' at line {}",
            value, column, line
        )));
    }
    Ok(parsed)
}
