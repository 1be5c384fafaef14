use crate::catalog::{EntityId, ModelId};
use crate::prelude::{HighlightMode, HighlightTarget};
use crate::telemetry::log::LogManager;

/// A placed entity marked for deletion, plus the model it was placed from so
/// the caller can drop the matching placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntity {
    pub entity: EntityId,
    pub model_id: ModelId,
}

/// Side effect for the caller to execute against the render scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightCommand {
    Apply { entity: EntityId, mode: HighlightMode },
    Clear { entity: EntityId },
}

impl HighlightCommand {
    pub fn execute<T: HighlightTarget + ?Sized>(self, target: &mut T) {
        match self {
            HighlightCommand::Apply { entity, mode } => target.set_highlight(entity, Some(mode)),
            HighlightCommand::Clear { entity } => target.set_highlight(entity, None),
        }
    }
}

/// Runs commands in order; clears always precede the apply they pair with.
pub fn execute_all<T: HighlightTarget + ?Sized>(commands: Vec<HighlightCommand>, target: &mut T) {
    for command in commands {
        command.execute(target);
    }
}

/// Result of a selection transition: the next state and the highlight writes
/// that take the scene from the old state to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: DeletionSelection,
    pub commands: Vec<HighlightCommand>,
}

/// Tracks at most one placed entity selected for deletion.
///
/// The selection never owns the entity; it only records which one carries the
/// deletion highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionSelection {
    selected: Option<SelectedEntity>,
    logger: LogManager,
}

impl DeletionSelection {
    pub fn new() -> Self {
        Self {
            selected: None,
            logger: LogManager::new("deletion"),
        }
    }

    pub fn selected(&self) -> Option<&SelectedEntity> {
        self.selected.as_ref()
    }

    /// Pure transition to `next`. The previous highlight is always cleared
    /// before the new one is applied, including when the same entity is
    /// selected again.
    pub fn transition(&self, next: Option<SelectedEntity>) -> Transition {
        let mut commands = Vec::with_capacity(2);
        if let Some(previous) = &self.selected {
            commands.push(HighlightCommand::Clear {
                entity: previous.entity,
            });
        }
        if let Some(entity) = &next {
            commands.push(HighlightCommand::Apply {
                entity: entity.entity,
                mode: HighlightMode::LightingDiffuse,
            });
        }

        Transition {
            state: DeletionSelection {
                selected: next,
                logger: self.logger,
            },
            commands,
        }
    }

    pub fn select(&mut self, entity: SelectedEntity) -> Vec<HighlightCommand> {
        self.logger
            .debug(&format!("selected entity {:?}", entity.entity));
        self.apply(Some(entity))
    }

    pub fn clear(&mut self) -> Vec<HighlightCommand> {
        if let Some(previous) = &self.selected {
            self.logger
                .debug(&format!("cleared selection of entity {:?}", previous.entity));
        }
        self.apply(None)
    }

    /// Clears the selection and hands back the entity that was selected, so
    /// the caller can remove its placements and anchor.
    pub fn take_for_deletion(&mut self) -> Option<(SelectedEntity, Vec<HighlightCommand>)> {
        let taken = self.selected.clone()?;
        self.logger.record(&format!(
            "entity {:?} (model {}) taken for deletion",
            taken.entity, taken.model_id
        ));
        let commands = self.apply(None);
        Some((taken, commands))
    }

    fn apply(&mut self, next: Option<SelectedEntity>) -> Vec<HighlightCommand> {
        let Transition { state, commands } = self.transition(next);
        *self = state;
        commands
    }
}

impl Default for DeletionSelection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingScene {
        highlights: HashMap<EntityId, HighlightMode>,
    }

    impl HighlightTarget for RecordingScene {
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

    fn entity(id: u64) -> SelectedEntity {
        SelectedEntity {
            entity: EntityId(id),
            model_id: ModelId::from(format!("model-{}", id % 3)),
        }
    }

    #[test]
    fn only_latest_selection_stays_highlighted() {
        let mut selection = DeletionSelection::new();
        let mut scene = RecordingScene::default();

        for id in [4, 9, 9, 2, 7, 4] {
            execute_all(selection.select(entity(id)), &mut scene);
            assert_eq!(scene.highlights.len(), 1);
            assert!(scene.highlights.contains_key(&EntityId(id)));
            assert_eq!(selection.selected().map(|s| s.entity), Some(EntityId(id)));
        }
    }

    #[test]
    fn clear_removes_every_highlight() {
        let mut selection = DeletionSelection::new();
        let mut scene = RecordingScene::default();

        execute_all(selection.clear(), &mut scene);
        assert!(scene.highlights.is_empty());

        execute_all(selection.select(entity(1)), &mut scene);
        execute_all(selection.select(entity(2)), &mut scene);
        execute_all(selection.clear(), &mut scene);
        assert!(scene.highlights.is_empty());
        assert!(selection.selected().is_none());
    }

    #[test]
    fn switching_selection_clears_before_applying() {
        let selection = DeletionSelection::new().transition(Some(entity(1))).state;
        let transition = selection.transition(Some(entity(2)));
        assert_eq!(
            transition.commands,
            vec![
                HighlightCommand::Clear { entity: EntityId(1) },
                HighlightCommand::Apply {
                    entity: EntityId(2),
                    mode: HighlightMode::LightingDiffuse
                },
            ]
        );
        // the source state is untouched by a pure transition
        assert_eq!(selection.selected().map(|s| s.entity), Some(EntityId(1)));
    }

    #[test]
    fn transitions_carry_the_component_logger() {
        let mut selection = DeletionSelection::default();
        selection.select(entity(3));
        selection.take_for_deletion();
        assert_eq!(selection, DeletionSelection::new());
    }

    #[test]
    fn take_for_deletion_returns_selected_entity() {
        let mut selection = DeletionSelection::new();
        assert!(selection.take_for_deletion().is_none());

        selection.select(entity(5));
        let (taken, commands) = selection.take_for_deletion().unwrap();
        assert_eq!(taken.entity, EntityId(5));
        assert_eq!(commands, vec![HighlightCommand::Clear { entity: EntityId(5) }]);
        assert!(selection.selected().is_none());
    }
}
