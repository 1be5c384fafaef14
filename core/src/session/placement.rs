use std::collections::HashSet;

use tokio::sync::watch;

use crate::catalog::{AnchorId, CatalogModel, ModelId, PlacementId, PlacementRecord};
use crate::telemetry::log::LogManager;

/// Catalog selection and placement bookkeeping for one AR screen.
///
/// Constructed once per screen and passed to whatever needs it; dropped (or
/// cleared) when the user navigates away.
pub struct PlacementSession {
    selected: watch::Sender<Option<CatalogModel>>,
    recently_placed: Vec<CatalogModel>,
    confirmed: Vec<PlacementRecord>,
    next_id: u64,
    logger: LogManager,
}

impl PlacementSession {
    pub fn new() -> Self {
        let (selected, _) = watch::channel(None);
        Self {
            selected,
            recently_placed: Vec::new(),
            confirmed: Vec::new(),
            next_id: 0,
            logger: LogManager::new("placement"),
        }
    }

    /// Observers see every selection change as soon as `set_selected_model`
    /// returns.
    pub fn subscribe(&self) -> watch::Receiver<Option<CatalogModel>> {
        self.selected.subscribe()
    }

    pub fn selected_model(&self) -> Option<CatalogModel> {
        self.selected.borrow().clone()
    }

    pub fn set_selected_model(&mut self, model: Option<CatalogModel>) {
        let name = model.as_ref().map(|m| m.name.as_str()).unwrap_or_default();
        self.logger.record(&format!("selected model '{}'", name));
        self.selected.send_replace(model);
    }

    /// Append-only; the same model may appear many times.
    pub fn record_recently_placed(&mut self, model: CatalogModel) {
        self.recently_placed.push(model);
    }

    pub fn recently_placed(&self) -> &[CatalogModel] {
        &self.recently_placed
    }

    /// Recents for display: most recent first, one entry per model id.
    pub fn recents_unique(&self) -> Vec<&CatalogModel> {
        let mut seen = HashSet::new();
        self.recently_placed
            .iter()
            .rev()
            .filter(|model| seen.insert(&model.id))
            .collect()
    }

    pub fn most_recent(&self) -> Option<&CatalogModel> {
        self.recently_placed.last()
    }

    /// Selects the most recently placed model again. Returns false when
    /// nothing has been placed yet.
    pub fn reselect_most_recent(&mut self) -> bool {
        match self.most_recent().cloned() {
            Some(model) => {
                self.set_selected_model(Some(model));
                true
            }
            None => false,
        }
    }

    pub fn confirm_placement(&mut self, model: CatalogModel, anchor: Option<AnchorId>) -> PlacementId {
        let id = PlacementId(self.next_id);
        self.next_id += 1;
        self.logger
            .record(&format!("confirmed '{}' as placement {}", model.name, id.0));
        self.confirmed.push(PlacementRecord { id, model, anchor });
        id
    }

    /// Confirms the current selection without an anchor, records it as
    /// recently placed and clears the selection.
    pub fn confirm_selected(&mut self) -> Option<PlacementId> {
        let model = self.selected_model()?;
        self.record_recently_placed(model.clone());
        let id = self.confirm_placement(model, None);
        self.set_selected_model(None);
        Some(id)
    }

    /// Attaches the anchor the AR subsystem resolved for an optimistic
    /// placement. Returns false for an unknown placement.
    pub fn attach_anchor(&mut self, placement: PlacementId, anchor: AnchorId) -> bool {
        match self.confirmed.iter_mut().find(|record| record.id == placement) {
            Some(record) => {
                record.anchor = Some(anchor);
                true
            }
            None => false,
        }
    }

    /// Removes every confirmed record whose model matches, keeping the order
    /// of the rest. Returns the removed records.
    pub fn remove_placement<F>(&mut self, mut matches: F) -> Vec<PlacementRecord>
    where
        F: FnMut(&CatalogModel) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.confirmed)
            .into_iter()
            .partition(|record| matches(&record.model));
        self.confirmed = kept;
        removed
    }

    pub fn remove_model(&mut self, model_id: &ModelId) -> Vec<PlacementRecord> {
        self.remove_placement(|model| &model.id == model_id)
    }

    pub fn confirmed(&self) -> &[PlacementRecord] {
        &self.confirmed
    }

    pub fn placement(&self, id: PlacementId) -> Option<&PlacementRecord> {
        self.confirmed.iter().find(|record| record.id == id)
    }

    pub fn anchored_count(&self) -> usize {
        self.confirmed.iter().filter(|record| record.is_anchored()).count()
    }

    /// Anchored records whose model no longer appears in `catalog`. They are
    /// reported, never pruned.
    pub fn orphaned_placements<'a>(&'a self, catalog: &[CatalogModel]) -> Vec<&'a PlacementRecord> {
        let known: HashSet<&ModelId> = catalog.iter().map(|model| &model.id).collect();
        self.confirmed
            .iter()
            .filter(|record| record.is_anchored() && !known.contains(&record.model.id))
            .collect()
    }

    /// Replaces the confirmed list with records restored from a snapshot.
    pub fn restore_placements(&mut self, records: Vec<PlacementRecord>) {
        self.next_id = records
            .iter()
            .map(|record| record.id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);
        self.confirmed = records;
    }

    pub fn clear(&mut self) {
        self.set_selected_model(None);
        self.recently_placed.clear();
        self.confirmed.clear();
    }
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityId, ModelCategory};
    use crate::session::deletion::{DeletionSelection, SelectedEntity};

    fn model(id: &str) -> CatalogModel {
        CatalogModel::new(id, format!("{}_name", id), ModelCategory::Chair)
    }

    #[test]
    fn selection_change_is_visible_to_observers_immediately() {
        let mut session = PlacementSession::new();
        let mut observer = session.subscribe();
        assert!(!observer.has_changed().unwrap());

        session.set_selected_model(Some(model("a")));
        assert!(observer.has_changed().unwrap());
        assert_eq!(observer.borrow_and_update().as_ref().map(|m| m.id.clone()), Some(ModelId::from("a")));

        session.set_selected_model(None);
        assert!(observer.borrow_and_update().is_none());
    }

    #[test]
    fn recently_placed_keeps_repeats() {
        let mut session = PlacementSession::new();
        session.record_recently_placed(model("a"));
        session.record_recently_placed(model("b"));
        session.record_recently_placed(model("a"));
        assert_eq!(session.recently_placed().len(), 3);

        let unique: Vec<_> = session.recents_unique().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(unique, vec!["a", "b"]);
        assert_eq!(session.most_recent().map(|m| m.id.as_str()), Some("a"));
    }

    #[test]
    fn removal_with_non_matching_predicate_preserves_order() {
        let mut session = PlacementSession::new();
        session.confirm_placement(model("a"), None);
        session.confirm_placement(model("b"), Some(AnchorId("anchor-1".into())));
        session.confirm_placement(model("a"), None);
        let before = session.confirmed().to_vec();

        let removed = session.remove_model(&ModelId::from("zzz"));
        assert!(removed.is_empty());
        assert_eq!(session.confirmed(), before.as_slice());

        let removed = session.remove_model(&ModelId::from("a"));
        assert_eq!(removed.len(), 2);
        assert!(session.confirmed().iter().all(|r| r.model.id.as_str() != "a"));
        assert_eq!(session.confirmed().len(), 1);
    }

    #[test]
    fn attach_anchor_resolves_optimistic_placement() {
        let mut session = PlacementSession::new();
        let id = session.confirm_placement(model("a"), None);
        assert_eq!(session.anchored_count(), 0);

        assert!(session.attach_anchor(id, AnchorId("anchor-7".into())));
        assert_eq!(session.anchored_count(), 1);
        assert!(!session.attach_anchor(PlacementId(99), AnchorId("x".into())));
    }

    #[test]
    fn confirm_selected_records_recent_and_clears_selection() {
        let mut session = PlacementSession::new();
        assert!(session.confirm_selected().is_none());

        session.set_selected_model(Some(model("lamp")));
        let id = session.confirm_selected().unwrap();
        assert!(session.selected_model().is_none());
        assert_eq!(session.recently_placed().len(), 1);
        assert_eq!(session.placement(id).map(|r| r.anchor.clone()), Some(None));

        assert!(session.reselect_most_recent());
        assert_eq!(session.selected_model().map(|m| m.id), Some(ModelId::from("lamp")));
    }

    #[test]
    fn orphans_are_reported_not_pruned() {
        let mut session = PlacementSession::new();
        let catalog = vec![model("a")];
        session.confirm_placement(model("a"), Some(AnchorId("1".into())));
        session.confirm_placement(model("gone"), Some(AnchorId("2".into())));
        session.confirm_placement(model("gone"), None);

        let orphans = session.orphaned_placements(&catalog);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].anchor, Some(AnchorId("2".into())));
        assert_eq!(session.confirmed().len(), 3);
    }

    #[test]
    fn restored_placements_do_not_reuse_ids() {
        let mut session = PlacementSession::new();
        session.restore_placements(vec![PlacementRecord {
            id: PlacementId(4),
            model: model("a"),
            anchor: None,
        }]);
        let id = session.confirm_placement(model("b"), None);
        assert_eq!(id, PlacementId(5));
    }

    #[test]
    fn select_confirm_highlight_remove_scenario() {
        let mut session = PlacementSession::new();
        let mut deletion = DeletionSelection::new();
        let model_a = model("A");

        assert!(session.selected_model().is_none());
        session.set_selected_model(Some(model_a.clone()));
        assert_eq!(session.selected_model(), Some(model_a.clone()));

        let id = session.confirm_placement(model_a.clone(), None);
        assert_eq!(session.confirmed().len(), 1);

        let entity = EntityId(id.0);
        let commands = deletion.select(SelectedEntity {
            entity,
            model_id: model_a.id.clone(),
        });
        assert_eq!(commands.len(), 1);
        assert_eq!(deletion.selected().map(|s| s.entity), Some(entity));

        session.remove_placement(|m| m.same_identity(&model_a));
        assert!(session.confirmed().is_empty());
    }
}
