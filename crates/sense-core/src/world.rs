//! World Adapters
//!
//! Boundary capabilities the host world supplies to the engine. The engine
//! never owns entity lifetimes or block state; it only asks.

use sense_events::{Aabb, BlockPos, Coord, EntityId, EntityKind, FeatureKind, PartitionId};

/// An alive entity returned by a box query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySighting {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Coord,
}

/// A registered settlement or other structure agents are drawn to.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub position: Coord,
    pub label: String,
}

/// Entity lookups for the direct-adversary and smell channels.
pub trait EntityQuery {
    /// Alive entities of any of `kinds` inside `bounds`.
    fn entities_in_box(
        &self,
        partition: &PartitionId,
        bounds: &Aabb,
        kinds: &[EntityKind],
    ) -> Vec<EntitySighting>;

    fn is_alive(&self, partition: &PartitionId, id: EntityId) -> bool;

    /// Current position of an alive entity.
    fn position_of(&self, partition: &PartitionId, id: EntityId) -> Option<Coord>;

    /// Whether `to` is visible from `from`. Worlds without occlusion see
    /// everything.
    fn has_line_of_sight(&self, _partition: &PartitionId, _from: &Coord, _to: &Coord) -> bool {
        true
    }
}

/// Block sampling for the feature scans. Each cache asks for its own kind.
pub trait BlockSampler {
    /// Attraction value of the feature at `pos`, if it emits `kind`.
    fn attraction(&self, kind: FeatureKind, partition: &PartitionId, pos: BlockPos) -> Option<f32>;
}

/// Settlement lookups for the structure channel.
pub trait PoiQuery {
    fn nearest_point_of_interest(
        &self,
        partition: &PartitionId,
        center: &Coord,
        radius: f64,
    ) -> Option<PointOfInterest>;
}

/// Global game conditions some channels are gated on.
pub trait WorldConditions {
    fn is_night(&self, partition: &PartitionId) -> bool;
}

/// Everything a controller needs from the world.
pub trait WorldView: EntityQuery + BlockSampler + PoiQuery + WorldConditions {}

impl<T> WorldView for T where T: EntityQuery + BlockSampler + PoiQuery + WorldConditions {}
