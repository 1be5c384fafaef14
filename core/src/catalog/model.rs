use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of a catalog model, as assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Furniture categories offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Table,
    Chair,
    Decor,
    Light,
}

impl ModelCategory {
    pub const ALL: [ModelCategory; 4] = [
        ModelCategory::Table,
        ModelCategory::Chair,
        ModelCategory::Decor,
        ModelCategory::Light,
    ];

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "table" => Some(ModelCategory::Table),
            "chair" => Some(ModelCategory::Chair),
            "decor" => Some(ModelCategory::Decor),
            "light" => Some(ModelCategory::Light),
            _ => None,
        }
    }

    /// Plural label used for browse section headers.
    pub fn label(&self) -> &'static str {
        match self {
            ModelCategory::Table => "Tables",
            ModelCategory::Chair => "Chairs",
            ModelCategory::Decor => "Decors",
            ModelCategory::Light => "Lights",
        }
    }
}

pub const DEFAULT_SCALE_COMPENSATION: f32 = 1.0;

/// A placeable furniture item definition fetched from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogModel {
    pub id: ModelId,
    pub name: String,
    pub category: ModelCategory,
    pub scale_compensation: f32,
}

impl CatalogModel {
    pub fn new(id: impl Into<ModelId>, name: impl Into<String>, category: ModelCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            scale_compensation: DEFAULT_SCALE_COMPENSATION,
        }
    }

    pub fn with_scale_compensation(mut self, scale: f32) -> Self {
        self.scale_compensation = normalize_scale(Some(f64::from(scale)));
        self
    }

    /// Builds a model from a loosely typed backend document.
    ///
    /// Missing or malformed fields never fail: the name becomes empty, the
    /// category falls back to `decor` and the scale to 1.0.
    pub fn from_document(id: impl Into<ModelId>, document: &Value) -> Self {
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let category = document
            .get("category")
            .and_then(Value::as_str)
            .and_then(ModelCategory::from_raw)
            .unwrap_or(ModelCategory::Decor);
        let scale = document.get("scaleCompensation").and_then(Value::as_f64);

        Self {
            id: id.into(),
            name,
            category,
            scale_compensation: normalize_scale(scale),
        }
    }

    pub fn same_identity(&self, other: &CatalogModel) -> bool {
        self.id == other.id
    }
}

fn normalize_scale(raw: Option<f64>) -> f32 {
    match raw {
        Some(value) if value.is_finite() && value > 0.0 => value as f32,
        _ => DEFAULT_SCALE_COMPENSATION,
    }
}
