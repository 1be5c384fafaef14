pub mod deletion;
pub mod placement;
pub mod settings;

pub use deletion::{DeletionSelection, HighlightCommand, SelectedEntity, Transition};
pub use placement::PlacementSession;
pub use settings::SessionSettings;
