use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::CatalogModel;

/// Identity of a platform-tracked anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(pub String);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Back-reference to an entity in the host render scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

/// Session-local identity of a confirmed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(pub u64);

/// Column-major 4x4 pose in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [f32; 16]);

impl Transform {
    pub const IDENTITY: Transform = Transform([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut matrix = Self::IDENTITY.0;
        matrix[12] = x;
        matrix[13] = y;
        matrix[14] = z;
        Self(matrix)
    }

    pub fn translation(&self) -> [f32; 3] {
        [self.0[12], self.0[13], self.0[14]]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A real-world pose tracked by the AR session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Anchor {
    pub id: AnchorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transform: Transform,
}

impl Anchor {
    pub fn new(id: AnchorId, transform: Transform) -> Self {
        Self {
            id,
            name: None,
            transform,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A confirmed placement: the catalog model plus, once resolved, its anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementRecord {
    pub id: PlacementId,
    pub model: CatalogModel,
    #[serde(default)]
    pub anchor: Option<AnchorId>,
}

impl PlacementRecord {
    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Render entity standing for this placement in the host scene graph.
    pub fn entity(&self) -> EntityId {
        EntityId(self.id.0)
    }
}
