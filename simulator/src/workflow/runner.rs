use crate::generator::session::SimulatedArSession;
use crate::gui_bridge::model::SessionView;
use crate::workflow::config::{SessionScript, Step};
use anyhow::{bail, Context};
use log::{info, warn};
use placementcore::catalog::{CatalogModel, PlacementRecord};
use placementcore::persistence::{PersistenceConfig, RunOptions, ScenePersistence};
use placementcore::prelude::ArSession;
use placementcore::session::deletion::execute_all;
use placementcore::session::{DeletionSelection, PlacementSession, SelectedEntity};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub placements: usize,
    pub anchored: usize,
    pub saves: usize,
    pub restores: usize,
    pub fallbacks: usize,
    pub failures: Vec<String>,
}

/// Replays scripted interactions against one placement session.
pub struct Runner {
    catalog: Vec<CatalogModel>,
    session: PlacementSession,
    deletion: DeletionSelection,
    persistence: ScenePersistence,
    ar: SimulatedArSession,
    summary: RunSummary,
}

impl Runner {
    pub fn new(script: &SessionScript, persistence: PersistenceConfig) -> anyhow::Result<Self> {
        let base = script.settings.configuration(script.world.capabilities);
        let mut ar = SimulatedArSession::new(script.world.clone())
            .context("starting simulated AR session")?;
        ar.run(base.clone(), RunOptions::default());

        Ok(Self {
            catalog: script.catalog_models(),
            session: PlacementSession::new(),
            deletion: DeletionSelection::new(),
            persistence: ScenePersistence::new(persistence).with_base_configuration(base),
            ar,
            summary: RunSummary::default(),
        })
    }

    pub async fn execute(&mut self, steps: &[Step]) -> anyhow::Result<RunSummary> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(step)
                .await
                .with_context(|| format!("step {} ({:?})", index + 1, step))?;
            self.summary.steps += 1;
        }

        self.summary.placements = self.session.confirmed().len();
        self.summary.anchored = self.session.anchored_count();
        Ok(self.summary.clone())
    }

    async fn apply(&mut self, step: &Step) -> anyhow::Result<()> {
        match step {
            Step::Select { model } => {
                let found = self.find_model(model)?.clone();
                self.session.set_selected_model(Some(found));
            }
            Step::Deselect => self.session.set_selected_model(None),
            Step::Confirm => {
                if self.session.confirm_selected().is_none() {
                    warn!("confirm ignored: no model selected");
                }
            }
            Step::PlaceRecent => {
                if self.session.reselect_most_recent() {
                    self.session.confirm_selected();
                } else {
                    warn!("nothing placed yet to place again");
                }
            }
            Step::ResolveAnchors => self.resolve_anchors(),
            Step::SelectEntity { index } => {
                let record = self.session.confirmed().get(*index).with_context(|| {
                    format!(
                        "no placement at index {} ({} placed)",
                        index,
                        self.session.confirmed().len()
                    )
                })?;
                let selected = SelectedEntity {
                    entity: record.entity(),
                    model_id: record.model.id.clone(),
                };
                let commands = self.deletion.select(selected);
                execute_all(commands, &mut self.ar);
            }
            Step::ClearEntitySelection => {
                let commands = self.deletion.clear();
                execute_all(commands, &mut self.ar);
            }
            Step::DeleteSelected => self.delete_selected(),
            Step::SetTracking { ready } => self.ar.set_tracking_ready(*ready),
            Step::Save => self.save().await,
            Step::Restore => {
                self.restore()?;
            }
            Step::Clear => self.clear_scene(),
        }
        Ok(())
    }

    fn find_model(&self, key: &str) -> anyhow::Result<&CatalogModel> {
        match self
            .catalog
            .iter()
            .find(|model| model.id.as_str() == key || model.name == key)
        {
            Some(model) => Ok(model),
            None => bail!("model '{}' is not in the catalog", key),
        }
    }

    fn resolve_anchors(&mut self) {
        let pending: Vec<_> = self
            .session
            .confirmed()
            .iter()
            .filter(|record| !record.is_anchored())
            .map(|record| (record.id, record.model.name.clone()))
            .collect();

        for (placement, name) in pending {
            let anchor = self.ar.add_anchor(&name);
            self.session.attach_anchor(placement, anchor);
        }
    }

    fn delete_selected(&mut self) {
        let Some((selected, commands)) = self.deletion.take_for_deletion() else {
            warn!("delete ignored: nothing selected");
            return;
        };
        execute_all(commands, &mut self.ar);

        let removed = self.session.remove_model(&selected.model_id);
        for anchor in removed.iter().filter_map(|record| record.anchor.as_ref()) {
            self.ar.remove_anchor(anchor);
        }
        info!(
            "deleted {} placement(s) of model {}",
            removed.len(),
            selected.model_id
        );
    }

    /// Drops every placement and the anchors they were attached to.
    fn clear_scene(&mut self) {
        let commands = self.deletion.clear();
        execute_all(commands, &mut self.ar);

        let anchors: Vec<_> = self
            .session
            .confirmed()
            .iter()
            .filter_map(|record| record.anchor.clone())
            .collect();
        for anchor in &anchors {
            self.ar.remove_anchor(anchor);
        }
        self.session.clear();
        info!("cleared scene, removed {} anchor(s)", anchors.len());
    }

    async fn save(&mut self) {
        if !ScenePersistence::is_available(self.ar.mapping_status(), self.session.anchored_count()) {
            warn!("scene save requested before the room is mapped with anchors");
        }

        match self
            .persistence
            .save_scene(&self.ar, self.session.confirmed())
            .await
        {
            Ok(_) => self.summary.saves += 1,
            Err(err) => self.summary.failures.push(err.to_string()),
        }
    }

    /// Restores the saved scene into the AR session. Returns false when no
    /// scene file exists.
    pub fn restore(&mut self) -> anyhow::Result<bool> {
        let Some(bytes) = self
            .persistence
            .load_saved()
            .context("reading saved scene")?
        else {
            info!("no saved scene at {}", self.persistence.scene_path().display());
            return Ok(false);
        };

        let commands = self.deletion.clear();
        execute_all(commands, &mut self.ar);

        let outcome = self.persistence.restore_scene(&mut self.ar, &bytes);
        if let Some(err) = outcome.fallback {
            self.summary.fallbacks += 1;
            self.summary.failures.push(err.to_string());
        }
        self.session.restore_placements(outcome.restored.placements);
        self.summary.restores += 1;
        Ok(true)
    }

    pub fn view(&self) -> SessionView {
        SessionView::capture(&self.session, &self.deletion, self.persistence.metrics())
    }

    pub fn placements(&self) -> &[PlacementRecord] {
        self.session.confirmed()
    }

    pub fn ar(&self) -> &SimulatedArSession {
        &self.ar
    }
}
