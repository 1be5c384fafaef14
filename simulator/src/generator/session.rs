use std::collections::HashMap;
use std::time::Duration;

use placementcore::catalog::{Anchor, AnchorId, EntityId};
use placementcore::persistence::{MappingStatus, RunOptions, WorldConfiguration, WorldMap};
use placementcore::prelude::{ArSession, HighlightMode, HighlightTarget, SceneError, SceneResult};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::generator::world::{random_floor_pose, scan_feature_points, WorldProfile};

/// In-process stand-in for the device AR session and its render scene.
pub struct SimulatedArSession {
    profile: WorldProfile,
    rng: StdRng,
    anchors: Vec<Anchor>,
    feature_points: Vec<[f32; 3]>,
    highlights: HashMap<EntityId, HighlightMode>,
    configuration: Option<WorldConfiguration>,
    runs: usize,
}

impl SimulatedArSession {
    pub fn new(profile: WorldProfile) -> anyhow::Result<Self> {
        let mut rng = StdRng::seed_from_u64(profile.seed);
        let feature_points = scan_feature_points(&profile, &mut rng)?;
        Ok(Self {
            profile,
            rng,
            anchors: Vec::new(),
            feature_points,
            highlights: HashMap::new(),
            configuration: None,
            runs: 0,
        })
    }

    pub fn set_tracking_ready(&mut self, ready: bool) {
        self.profile.tracking_ready = ready;
    }

    pub fn mapping_status(&self) -> MappingStatus {
        if self.profile.tracking_ready {
            self.profile.mapping_status
        } else {
            MappingStatus::Limited
        }
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn highlighted(&self) -> Vec<EntityId> {
        let mut entities: Vec<_> = self.highlights.keys().copied().collect();
        entities.sort();
        entities
    }

    pub fn configuration(&self) -> Option<&WorldConfiguration> {
        self.configuration.as_ref()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl ArSession for SimulatedArSession {
    async fn current_world_map(&self) -> SceneResult<WorldMap> {
        tokio::time::sleep(Duration::from_millis(self.profile.capture_delay_ms)).await;
        if !self.profile.tracking_ready {
            return Err(SceneError::WorldMapUnavailable(
                "tracking has not been established".into(),
            ));
        }

        Ok(WorldMap {
            center: self.profile.center(),
            extent: self.profile.room_extent(),
            anchors: self.anchors.clone(),
            feature_points: self.feature_points.clone(),
        })
    }

    fn run(&mut self, configuration: WorldConfiguration, options: RunOptions) {
        if options.remove_existing_anchors {
            self.anchors.clear();
            self.highlights.clear();
        }
        if options.reset_tracking {
            self.feature_points.clear();
        }
        if let Some(map) = &configuration.initial_world_map {
            self.anchors.extend(map.anchors.iter().cloned());
            self.feature_points = map.feature_points.clone();
        }
        self.configuration = Some(configuration);
        self.runs += 1;
    }

    fn add_anchor(&mut self, name: &str) -> AnchorId {
        let id = AnchorId(format!("anchor-{:016x}", self.rng.gen::<u64>()));
        let pose = random_floor_pose(&self.profile, &mut self.rng);
        self.anchors.push(Anchor::new(id.clone(), pose).named(name));
        id
    }

    fn remove_anchor(&mut self, anchor: &AnchorId) {
        self.anchors.retain(|existing| &existing.id != anchor);
    }
}

impl HighlightTarget for SimulatedArSession {
    fn set_highlight(&mut self, entity: EntityId, mode: Option<HighlightMode>) {
        match mode {
            Some(mode) => {
                self.highlights.insert(entity, mode);
            }
            None => {
                self.highlights.remove(&entity);
            }
        }
    }
}
