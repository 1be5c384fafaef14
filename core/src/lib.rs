//! Placement session state and scene persistence for the HouseRizz AR room
//! planner.
//!
//! The host application owns rendering and the platform AR session; this crate
//! keeps the bookkeeping around it: which catalog model is chosen, what has
//! been placed and anchored, which placed entity is marked for deletion, and
//! how a room layout is snapshotted to disk and restored.

pub mod catalog;
pub mod persistence;
pub mod prelude;
pub mod session;
pub mod telemetry;

pub use prelude::{ArSession, HighlightTarget, SceneError, SceneResult};
