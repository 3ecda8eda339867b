//! Shared perception types for the mob senses workspace.
//!
//! This crate contains pure data structures with no engine logic.
//! It is a dependency for all other crates in the workspace.

pub mod acoustic;
pub mod feature;
pub mod geometry;
pub mod ids;
pub mod perception;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use acoustic::{AcousticEvent, SoundCategory};
pub use feature::{FeatureKind, FeatureSource};
pub use geometry::{Aabb, BlockPos, Coord};
pub use ids::{AgentKey, EntityId, PartitionId, Step};
pub use perception::{Channel, DecisionRecord, EntityKind, PerceptionTarget, Transition};
