use anyhow::Context;
use placementcore::catalog::{CatalogModel, ModelId};
use placementcore::persistence::PersistenceConfig;
use placementcore::session::SessionSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::generator::world::WorldProfile;

/// One user interaction on the AR screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Pick a catalog model by id or display name.
    Select { model: String },
    Deselect,
    /// Confirm the selected model at the focus point.
    Confirm,
    /// Select the most recently placed model and confirm it again.
    PlaceRecent,
    /// Let the tracker resolve anchors for every unanchored placement.
    ResolveAnchors,
    /// Long-press the placement at `index` in confirmed order.
    SelectEntity { index: usize },
    ClearEntitySelection,
    DeleteSelected,
    SetTracking { ready: bool },
    Save,
    Restore,
    Clear,
}

/// A scripted AR session: catalog, device behaviour and the interactions to
/// replay.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    pub settings: SessionSettings,
    pub world: WorldProfile,
    pub persistence: PersistenceConfig,
    /// Backend documents, decoded leniently.
    pub catalog: Vec<Value>,
    pub steps: Vec<Step>,
}

impl SessionScript {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session script {}", path_ref.display()))?;
        let script: SessionScript = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session script {}", path_ref.display()))?;
        Ok(script)
    }

    /// Built-in living-room walkthrough used when no script is given.
    pub fn demo() -> Self {
        let catalog = ["swan_chair:chair", "oak_table:table", "fern:decor", "arc_lamp:light"]
            .iter()
            .filter_map(|entry| entry.split_once(':'))
            .map(|(name, category)| serde_json::json!({"name": name, "category": category}))
            .collect();

        let select = |model: &str| Step::Select {
            model: model.to_string(),
        };

        Self {
            catalog,
            steps: vec![
                select("swan_chair"),
                Step::Confirm,
                select("oak_table"),
                Step::Confirm,
                Step::PlaceRecent,
                Step::ResolveAnchors,
                Step::SelectEntity { index: 0 },
                Step::SelectEntity { index: 1 },
                Step::DeleteSelected,
                select("arc_lamp"),
                Step::Confirm,
                Step::ResolveAnchors,
                Step::Save,
                Step::Clear,
                Step::Restore,
            ],
            ..Default::default()
        }
    }

    /// Catalog models keyed by the document's `id`, or its name when absent.
    pub fn catalog_models(&self) -> Vec<CatalogModel> {
        self.catalog
            .iter()
            .enumerate()
            .map(|(index, document)| {
                let id = document
                    .get("id")
                    .and_then(Value::as_str)
                    .or_else(|| document.get("name").and_then(Value::as_str))
                    .map(ModelId::from)
                    .unwrap_or_else(|| ModelId(format!("model-{}", index)));
                CatalogModel::from_document(id, document)
            })
            .collect()
    }
}
