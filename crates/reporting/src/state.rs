//! Dashboard state persistence — a small set of filter selections
//! serialized as JSON. The parse is a strict typed deserialization: a
//! malformed payload is rejected whole and never partially applied.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rewards_core::types::{ColumnMapping, FilterCriteria, UserSegment};
use rewards_core::RewardsResult;

/// Everything needed to restore a dashboard session: the date window,
/// the brand and segment selections, and the column mapping in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub selected_brands: Vec<String>,
    pub selected_segments: Vec<UserSegment>,
    #[serde(default)]
    pub column_mapping: ColumnMapping,
}

impl DashboardState {
    /// Parse a persisted state payload. Any malformed or ill-typed text
    /// fails with a deserialization error.
    pub fn from_json(text: &str) -> RewardsResult<Self> {
        let state: DashboardState = serde_json::from_str(text)?;
        Ok(state)
    }

    pub fn to_json(&self) -> RewardsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The filter criteria this state restores.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::unfiltered()
            .date_range(self.start_date, self.end_date)
            .brands(self.selected_brands.clone())
            .segments(self.selected_segments.clone())
    }
}

// ─── Saved State Store ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedState {
    pub id: Uuid,
    pub name: String,
    pub state: DashboardState,
    pub saved_at: DateTime<Utc>,
}

/// Named saved states for the current session.
pub struct StateStore {
    states: DashMap<Uuid, SavedState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn save(&self, name: impl Into<String>, state: DashboardState) -> Uuid {
        let id = Uuid::new_v4();
        self.states.insert(
            id,
            SavedState {
                id,
                name: name.into(),
                state,
                saved_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<SavedState> {
        self.states.get(id).map(|s| s.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<SavedState> {
        self.states.remove(id).map(|(_, s)| s)
    }

    pub fn list(&self) -> Vec<SavedState> {
        let mut all: Vec<SavedState> = self.states.iter().map(|s| s.value().clone()).collect();
        all.sort_by_key(|s| s.saved_at);
        all
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_core::RewardsError;

    fn make_state() -> DashboardState {
        DashboardState {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            selected_brands: vec!["Acme".into(), "Globex".into()],
            selected_segments: vec![UserSegment::HighValue, UserSegment::MediumValue],
            column_mapping: ColumnMapping::default(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let state = make_state();
        let json = state.to_json().unwrap();
        let restored = DashboardState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_segments_serialize_with_display_labels() {
        let json = make_state().to_json().unwrap();
        assert!(json.contains("\"High Value\""));
    }

    #[test]
    fn test_malformed_payload_is_deserialization_error() {
        let err = DashboardState::from_json("{'start_date': broken").unwrap_err();
        assert!(matches!(err, RewardsError::Deserialization(_)));
    }

    #[test]
    fn test_ill_typed_payload_is_rejected_whole() {
        // Well-formed JSON, wrong shape: must not partially apply.
        let err =
            DashboardState::from_json("{\"start_date\": \"2024-01-01\", \"end_date\": 7}")
                .unwrap_err();
        assert!(matches!(err, RewardsError::Deserialization(_)));
    }

    #[test]
    fn test_criteria_reflects_selections() {
        let criteria = make_state().criteria();
        assert_eq!(criteria.brands.as_deref(), Some(&["Acme".to_string(), "Globex".to_string()][..]));
        assert_eq!(
            criteria.start_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_store_save_get_list() {
        let store = StateStore::new();
        let id = store.save("q1 review", make_state());
        assert_eq!(store.get(&id).unwrap().name, "q1 review");
        assert_eq!(store.list().len(), 1);
        store.remove(&id);
        assert!(store.get(&id).is_none());
    }
}
