//! Rewards dashboard pipeline — loads a redemption CSV, derives metrics and
//! segments, applies filter criteria, and prints every aggregation view as
//! JSON for the presentation layer.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::info;

use rewards_core::config::{AppConfig, ExportConfig};
use rewards_core::types::{FilterCriteria, UserSegment};
use rewards_ingest::{CachedLoader, RecordLoader};
use rewards_reporting::{export, DashboardState, ViewSnapshot};
use rewards_segmentation::{enrich, SegmentPolicy};

#[derive(Parser, Debug)]
#[command(name = "rewards-dashboard")]
#[command(about = "Metrics and segmentation pipeline for rewards program analytics")]
#[command(version)]
struct Cli {
    /// Path to the redemption CSV (overrides config)
    #[arg(long, env = "REWARDS__DATA__PATH")]
    data: Option<String>,

    /// Segmentation policy
    #[arg(long, value_enum, default_value_t = PolicyArg::FixedThreshold)]
    policy: PolicyArg,

    /// Brand to include (repeatable; default all)
    #[arg(long = "brand")]
    brands: Vec<String>,

    /// Segment to include (repeatable; default all)
    #[arg(long = "segment")]
    segments: Vec<UserSegment>,

    /// Inclusive start of the date range (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Inclusive end of the date range (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Restore filters and column mapping from a saved state JSON file
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the filtered enriched table as CSV; with no value the
    /// destination comes from the export config
    #[arg(long)]
    export: Option<Option<PathBuf>>,

    /// Write the active filter selections as a state JSON file
    #[arg(long)]
    save_state: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    FixedThreshold,
    Tertiles,
}

impl From<PolicyArg> for SegmentPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FixedThreshold => SegmentPolicy::FixedThreshold,
            PolicyArg::Tertiles => SegmentPolicy::RedemptionTertiles,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rewards_dashboard=info,rewards_ingest=info,rewards_reporting=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(path) = cli.data {
        config.data.path = path;
    }

    // A saved state restores its filters and column mapping wholesale;
    // otherwise the criteria come from individual flags.
    let saved_state = match &cli.state {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Some(DashboardState::from_json(&text)?)
        }
        None => None,
    };

    let criteria = match &saved_state {
        Some(state) => state.criteria(),
        None => {
            let mut criteria = FilterCriteria::unfiltered();
            criteria.start_date = cli.start_date;
            criteria.end_date = cli.end_date;
            if !cli.brands.is_empty() {
                criteria.brands = Some(cli.brands.clone());
            }
            if !cli.segments.is_empty() {
                criteria.segments = Some(cli.segments.clone());
            }
            criteria
        }
    };

    let mut loader = RecordLoader::new().with_date_formats(config.data.date_formats.clone());
    if let Some(state) = &saved_state {
        loader = loader.with_columns(state.column_mapping.clone());
    }

    let records = if config.cache.enabled {
        CachedLoader::new(loader).load(&config.data.path)?.to_vec()
    } else {
        loader.load_path(&config.data.path)?
    };

    let policy: SegmentPolicy = cli.policy.into();
    let enriched = enrich(&records, policy);
    let snapshot = ViewSnapshot::compute(&enriched, &criteria);

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if let Some(explicit) = cli.export {
        let path = resolve_export_path(explicit, &config.export);
        let filtered = rewards_reporting::snapshot::apply_criteria(&enriched, &criteria);
        let csv = export::to_csv(&filtered)?;
        std::fs::write(&path, csv)?;
        info!(path = %path.display(), rows = filtered.len(), "wrote filtered export");
    }

    if let Some(path) = cli.save_state {
        let state = state_from_criteria(&criteria, &enriched, saved_state);
        std::fs::write(&path, state.to_json()?)?;
        info!(path = %path.display(), "saved dashboard state");
    }

    Ok(())
}

/// Export destination: the explicit CLI path when given, otherwise the
/// configured default.
fn resolve_export_path(explicit: Option<PathBuf>, config: &ExportConfig) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(&config.output_path))
}

/// Build a persistable state from the active criteria, falling back to the
/// observed data bounds where no explicit selection was made.
fn state_from_criteria(
    criteria: &FilterCriteria,
    enriched: &[rewards_core::types::EnrichedRecord],
    restored: Option<DashboardState>,
) -> DashboardState {
    let min_date = enriched.iter().map(|r| r.record.redeemed_on).min();
    let max_date = enriched.iter().map(|r| r.record.redeemed_on).max();
    let fallback = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

    let mut all_brands: Vec<String> = Vec::new();
    for row in enriched {
        if !all_brands.contains(&row.record.brand) {
            all_brands.push(row.record.brand.clone());
        }
    }

    DashboardState {
        start_date: criteria.start_date.or(min_date).unwrap_or(fallback),
        end_date: criteria.end_date.or(max_date).unwrap_or(fallback),
        selected_brands: criteria.brands.clone().unwrap_or(all_brands),
        selected_segments: criteria
            .segments
            .clone()
            .unwrap_or_else(|| UserSegment::ALL.to_vec()),
        column_mapping: restored.map(|s| s.column_mapping).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_prefers_explicit_flag() {
        let config = ExportConfig::default();
        let path = resolve_export_path(Some(PathBuf::from("out.csv")), &config);
        assert_eq!(path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_export_path_falls_back_to_config() {
        let config = ExportConfig {
            output_path: "exports/filtered.csv".to_string(),
        };
        let path = resolve_export_path(None, &config);
        assert_eq!(path, PathBuf::from("exports/filtered.csv"));
    }
}
