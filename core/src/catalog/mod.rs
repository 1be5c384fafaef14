pub mod model;
pub mod placement;

pub use model::{CatalogModel, ModelCategory, ModelId};
pub use placement::{Anchor, AnchorId, EntityId, PlacementId, PlacementRecord, Transform};
