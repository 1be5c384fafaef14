use serde::{Deserialize, Serialize};

use crate::catalog::{Anchor, AnchorId, PlacementRecord, Transform};

/// How well the AR session has mapped the surrounding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    #[default]
    NotAvailable,
    Limited,
    Extending,
    Mapped,
}

/// Spatial understanding of a session: feature points, anchors and the
/// coordinate origin they are expressed in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldMap {
    pub center: [f32; 3],
    pub extent: [f32; 3],
    pub anchors: Vec<Anchor>,
    pub feature_points: Vec<[f32; 3]>,
}

impl WorldMap {
    pub fn anchor(&self, id: &AnchorId) -> Option<&Anchor> {
        self.anchors.iter().find(|anchor| &anchor.id == id)
    }

    /// Anchors keyed by identity, sorted for comparison.
    pub fn anchor_set(&self) -> Vec<(AnchorId, Transform)> {
        let mut set: Vec<_> = self
            .anchors
            .iter()
            .map(|anchor| (anchor.id.clone(), anchor.transform))
            .collect();
        set.sort_by(|a, b| a.0.cmp(&b.0));
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneDetection {
    pub horizontal: bool,
    pub vertical: bool,
}

/// What the current device can do; features it lacks are left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub scene_reconstruction: bool,
    pub person_segmentation: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            scene_reconstruction: true,
            person_segmentation: true,
        }
    }
}

/// World-tracking configuration handed to `ArSession::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfiguration {
    pub plane_detection: PlaneDetection,
    pub scene_reconstruction: bool,
    pub person_segmentation: bool,
    pub object_occlusion: bool,
    pub show_scene_understanding: bool,
    pub collaboration: bool,
    pub initial_world_map: Option<WorldMap>,
}

impl Default for WorldConfiguration {
    fn default() -> Self {
        Self {
            plane_detection: PlaneDetection {
                horizontal: true,
                vertical: true,
            },
            scene_reconstruction: false,
            person_segmentation: false,
            object_occlusion: false,
            show_scene_understanding: false,
            collaboration: false,
            initial_world_map: None,
        }
    }
}

impl WorldConfiguration {
    pub fn with_initial_world_map(mut self, map: Option<WorldMap>) -> Self {
        self.initial_world_map = map;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl RunOptions {
    /// Used for every restore so old and new coordinate spaces never share
    /// anchor identities.
    pub const RESTORE: RunOptions = RunOptions {
        reset_tracking: true,
        remove_existing_anchors: true,
    };
}

/// A configuration ready to re-run the AR session, plus the placements that
/// need their objects rebuilt once the anchors come back.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredWorldConfig {
    pub configuration: WorldConfiguration,
    pub options: RunOptions,
    pub placements: Vec<PlacementRecord>,
}

impl RestoredWorldConfig {
    pub fn is_empty(&self) -> bool {
        self.configuration.initial_world_map.is_none() && self.placements.is_empty()
    }
}
