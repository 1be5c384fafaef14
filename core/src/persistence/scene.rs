use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::catalog::PlacementRecord;
use crate::persistence::snapshot::SceneSnapshot;
use crate::persistence::world::{MappingStatus, RestoredWorldConfig, RunOptions, WorldConfiguration};
use crate::prelude::{ArSession, SceneError, SceneResult};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

pub const DEFAULT_SCENE_FILE: &str = "scene.hrzscene";
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 10_000;

/// Where the scene file lives and how long a world-map capture may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub scene_path: PathBuf,
    pub capture_timeout_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from(DEFAULT_SCENE_FILE),
            capture_timeout_ms: DEFAULT_CAPTURE_TIMEOUT_MS,
        }
    }
}

impl PersistenceConfig {
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }
}

/// Outcome of restoring into a running session. `fallback` is set when the
/// snapshot could not be decoded and an empty scene was run instead.
#[derive(Debug)]
pub struct RestoreOutcome {
    pub restored: RestoredWorldConfig,
    pub fallback: Option<SceneError>,
}

/// Snapshots the AR world to a single local scene file and restores it.
///
/// Overlapping saves are not serialized here; callers issue one at a time.
pub struct ScenePersistence {
    config: PersistenceConfig,
    base_configuration: WorldConfiguration,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl ScenePersistence {
    pub fn new(config: PersistenceConfig) -> Self {
        Self {
            config,
            base_configuration: WorldConfiguration::default(),
            logger: LogManager::new("persistence"),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Configuration restored maps are layered onto (plane detection,
    /// occlusion and so on). Any initial map it carries is replaced.
    pub fn with_base_configuration(mut self, configuration: WorldConfiguration) -> Self {
        self.base_configuration = configuration.with_initial_world_map(None);
        self
    }

    pub fn scene_path(&self) -> &Path {
        &self.config.scene_path
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Saving only makes sense once the space is mapped and something has
    /// been placed in it.
    pub fn is_available(status: MappingStatus, anchor_count: usize) -> bool {
        matches!(status, MappingStatus::Mapped | MappingStatus::Extending) && anchor_count > 0
    }

    /// Captures the world map, serializes it with the placements and writes
    /// it atomically to the scene file. Failures are logged and returned;
    /// the previous file, if any, is left untouched.
    pub async fn save_scene<S: ArSession>(
        &self,
        session: &S,
        placements: &[PlacementRecord],
    ) -> SceneResult<SceneSnapshot> {
        let result = self.capture_and_write(session, placements).await;
        match &result {
            Ok(snapshot) => {
                self.metrics.record_save();
                self.logger.record(&format!(
                    "saved scene with {} anchors and {} placements to {}",
                    snapshot.world_map.anchors.len(),
                    snapshot.placements.len(),
                    self.config.scene_path.display()
                ));
            }
            Err(err) => {
                self.metrics.record_failure();
                self.logger.warn(&format!("scene not saved: {}", err));
            }
        }
        result
    }

    async fn capture_and_write<S: ArSession>(
        &self,
        session: &S,
        placements: &[PlacementRecord],
    ) -> SceneResult<SceneSnapshot> {
        let timeout = self.config.capture_timeout();
        let world_map = tokio::time::timeout(timeout, session.current_world_map())
            .await
            .map_err(|_| {
                SceneError::WorldMapUnavailable(format!(
                    "capture did not finish within {} ms",
                    timeout.as_millis()
                ))
            })??;

        let snapshot = SceneSnapshot::new(world_map, placements.to_vec());
        let bytes = snapshot.encode()?;
        write_atomically(&self.config.scene_path, &bytes).map_err(|source| {
            SceneError::PersistenceWrite {
                path: self.config.scene_path.clone(),
                source,
            }
        })?;
        Ok(snapshot)
    }

    /// Decodes a snapshot into a configuration that re-runs the session with
    /// tracking reset and existing anchors removed.
    pub fn load_scene(&self, bytes: &[u8]) -> SceneResult<RestoredWorldConfig> {
        let snapshot = SceneSnapshot::decode(bytes)?;
        self.metrics.record_load();
        Ok(RestoredWorldConfig {
            configuration: self
                .base_configuration
                .clone()
                .with_initial_world_map(Some(snapshot.world_map)),
            options: RunOptions::RESTORE,
            placements: snapshot.placements,
        })
    }

    /// Like `load_scene`, but a bad snapshot degrades to a fresh empty scene
    /// instead of failing.
    pub fn load_scene_or_empty(&self, bytes: &[u8]) -> RestoreOutcome {
        match self.load_scene(bytes) {
            Ok(restored) => RestoreOutcome {
                restored,
                fallback: None,
            },
            Err(err) => {
                self.metrics.record_failure();
                self.logger
                    .warn(&format!("falling back to an empty scene: {}", err));
                RestoreOutcome {
                    restored: self.empty_scene(),
                    fallback: Some(err),
                }
            }
        }
    }

    /// Restores `bytes` into `session`. The session is always re-run with
    /// reset options, even when the snapshot was unusable.
    pub fn restore_scene<S: ArSession>(&self, session: &mut S, bytes: &[u8]) -> RestoreOutcome {
        let outcome = self.load_scene_or_empty(bytes);
        session.run(
            outcome.restored.configuration.clone(),
            outcome.restored.options,
        );
        outcome
    }

    /// Reads the scene file. A missing file means nothing was saved yet.
    pub fn load_saved(&self) -> SceneResult<Option<Vec<u8>>> {
        match fs::read(&self.config.scene_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SceneError::PersistenceRead {
                path: self.config.scene_path.clone(),
                source,
            }),
        }
    }

    fn empty_scene(&self) -> RestoredWorldConfig {
        RestoredWorldConfig {
            configuration: self.base_configuration.clone(),
            options: RunOptions::RESTORE,
            placements: Vec::new(),
        }
    }
}

/// Writes to a temporary file beside `path` and renames it into place, so
/// readers see either the old scene or the new one.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
