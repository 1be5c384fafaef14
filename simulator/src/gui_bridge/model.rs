use placementcore::session::{DeletionSelection, PlacementSession};
use placementcore::telemetry::MetricsSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacementView {
    pub id: u64,
    pub model: String,
    pub category: String,
    pub anchor: Option<String>,
}

/// What a host UI binds to: the current state of one placement session.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct SessionView {
    pub selected_model: Option<String>,
    pub recents: Vec<String>,
    pub placements: Vec<PlacementView>,
    pub selected_for_deletion: Option<u64>,
    pub persistence: MetricsSnapshot,
}

impl SessionView {
    pub fn capture(
        session: &PlacementSession,
        deletion: &DeletionSelection,
        persistence: MetricsSnapshot,
    ) -> Self {
        Self {
            selected_model: session.selected_model().map(|model| model.name),
            recents: session
                .recents_unique()
                .into_iter()
                .map(|model| model.name.clone())
                .collect(),
            placements: session
                .confirmed()
                .iter()
                .map(|record| PlacementView {
                    id: record.id.0,
                    model: record.model.name.clone(),
                    category: record.model.category.label().to_string(),
                    anchor: record.anchor.as_ref().map(|anchor| anchor.to_string()),
                })
                .collect(),
            selected_for_deletion: deletion.selected().map(|selected| selected.entity.0),
            persistence,
        }
    }
}
