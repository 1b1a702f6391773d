//! Derived-metric calculation and user segmentation — turns raw redemption
//! records into the enriched table consumed by every reporting view.

pub mod metrics;
pub mod policy;

pub use metrics::{efficiency, engagement_score, enrich};
pub use policy::SegmentPolicy;
