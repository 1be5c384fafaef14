use serde::{Deserialize, Serialize};

use crate::persistence::world::{DeviceCapabilities, WorldConfiguration};

/// User-facing toggles for the AR screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub people_occlusion: bool,
    pub object_occlusion: bool,
    pub lidar_debug: bool,
    pub multiuser: bool,
}

impl SessionSettings {
    /// Default world-tracking configuration with these settings folded in.
    pub fn configuration(&self, capabilities: DeviceCapabilities) -> WorldConfiguration {
        WorldConfiguration {
            scene_reconstruction: capabilities.scene_reconstruction,
            person_segmentation: self.people_occlusion && capabilities.person_segmentation,
            object_occlusion: self.object_occlusion,
            show_scene_understanding: self.lidar_debug,
            collaboration: self.multiuser,
            ..WorldConfiguration::default()
        }
    }
}
