//! Rewards program reporting — aggregation views, correlation analysis,
//! CSV export, and dashboard state persistence.

pub mod correlation;
pub mod export;
pub mod snapshot;
pub mod state;
pub mod views;

pub use correlation::CorrelationMatrix;
pub use snapshot::ViewSnapshot;
pub use state::{DashboardState, StateStore};
