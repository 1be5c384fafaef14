pub mod scene;
pub mod snapshot;
pub mod world;

pub use scene::{PersistenceConfig, RestoreOutcome, ScenePersistence};
pub use snapshot::SceneSnapshot;
pub use world::{
    DeviceCapabilities, MappingStatus, PlaneDetection, RestoredWorldConfig, RunOptions,
    WorldConfiguration, WorldMap,
};
