use std::future::Future;
use std::io;
use std::path::PathBuf;

use crate::catalog::{AnchorId, EntityId};
use crate::persistence::world::{RunOptions, WorldConfiguration, WorldMap};

/// Coarse classification of scene failures, used by callers to decide
/// whether to retry, notify the user, or fall back to an empty scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    WorldMapUnavailable,
    Serialization,
    PersistenceWrite,
    PersistenceRead,
    Deserialization,
}

/// Common error type for scene capture, storage and restore.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("world map unavailable: {0}")]
    WorldMapUnavailable(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("failed to write scene to {path}: {source}")]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read scene from {path}: {source}")]
    PersistenceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl SceneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::WorldMapUnavailable(_) => ErrorKind::WorldMapUnavailable,
            SceneError::Serialization(_) => ErrorKind::Serialization,
            SceneError::PersistenceWrite { .. } => ErrorKind::PersistenceWrite,
            SceneError::PersistenceRead { .. } => ErrorKind::PersistenceRead,
            SceneError::Deserialization(_) => ErrorKind::Deserialization,
        }
    }

    /// Capture failures clear up once tracking settles; everything else needs
    /// a different input or user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SceneError::WorldMapUnavailable(_))
    }
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Visualization applied to an entity while it is marked for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightMode {
    LightingDiffuse,
}

/// The render-scene attribute that `DeletionSelection` drives.
///
/// Implementations write the highlight attribute of the entity and nothing
/// else; no other code path should touch it.
pub trait HighlightTarget {
    fn set_highlight(&mut self, entity: EntityId, mode: Option<HighlightMode>);
}

/// Host AR session consumed by scene persistence and the placement driver.
pub trait ArSession {
    /// Captures the current world map. Fails with
    /// `SceneError::WorldMapUnavailable` while tracking is not established.
    fn current_world_map(&self) -> impl Future<Output = SceneResult<WorldMap>>;

    /// Reconfigures the running session.
    fn run(&mut self, configuration: WorldConfiguration, options: RunOptions);

    /// Adds a real-world anchor at the current focus point.
    fn add_anchor(&mut self, name: &str) -> AnchorId;

    fn remove_anchor(&mut self, anchor: &AnchorId);
}
