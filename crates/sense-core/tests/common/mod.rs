//! In-memory world used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use sense_core::{
    BlockSampler, EntityQuery, EntitySighting, PoiQuery, PointOfInterest, WorldConditions,
};
use sense_events::{Aabb, BlockPos, Coord, EntityId, EntityKind, FeatureKind, PartitionId};

#[derive(Debug, Default)]
pub struct TestWorld {
    pub entities: Vec<EntitySighting>,
    pub features: HashMap<(FeatureKind, BlockPos), f32>,
    pub pois: Vec<PointOfInterest>,
    pub night: bool,
    /// Everything on the far side of this x coordinate is hidden from sight
    pub wall_x: Option<f64>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, id: u64, kind: EntityKind, position: Coord) -> Self {
        self.add_entity(id, kind, position);
        self
    }

    pub fn with_feature(mut self, kind: FeatureKind, pos: BlockPos, weight: f32) -> Self {
        self.features.insert((kind, pos), weight);
        self
    }

    pub fn with_poi(mut self, position: Coord, label: &str) -> Self {
        self.pois.push(PointOfInterest {
            position,
            label: label.to_string(),
        });
        self
    }

    pub fn at_night(mut self) -> Self {
        self.night = true;
        self
    }

    pub fn add_entity(&mut self, id: u64, kind: EntityKind, position: Coord) {
        self.entities.push(EntitySighting {
            id: EntityId(id),
            kind,
            position,
        });
    }

    pub fn remove_entity(&mut self, id: u64) {
        self.entities.retain(|e| e.id != EntityId(id));
    }

    pub fn move_entity(&mut self, id: u64, position: Coord) {
        if let Some(entity) = self.entities.iter_mut().find(|e| e.id == EntityId(id)) {
            entity.position = position;
        }
    }
}

impl EntityQuery for TestWorld {
    fn entities_in_box(
        &self,
        _partition: &PartitionId,
        bounds: &Aabb,
        kinds: &[EntityKind],
    ) -> Vec<EntitySighting> {
        self.entities
            .iter()
            .filter(|e| kinds.contains(&e.kind) && bounds.contains(&e.position))
            .copied()
            .collect()
    }

    fn is_alive(&self, _partition: &PartitionId, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    fn position_of(&self, _partition: &PartitionId, id: EntityId) -> Option<Coord> {
        self.entities.iter().find(|e| e.id == id).map(|e| e.position)
    }

    fn has_line_of_sight(&self, _partition: &PartitionId, from: &Coord, to: &Coord) -> bool {
        match self.wall_x {
            Some(wall) => (from.x < wall) == (to.x < wall),
            None => true,
        }
    }
}

impl BlockSampler for TestWorld {
    fn attraction(&self, kind: FeatureKind, _partition: &PartitionId, pos: BlockPos) -> Option<f32> {
        self.features.get(&(kind, pos)).copied()
    }
}

impl PoiQuery for TestWorld {
    fn nearest_point_of_interest(
        &self,
        _partition: &PartitionId,
        center: &Coord,
        radius: f64,
    ) -> Option<PointOfInterest> {
        self.pois
            .iter()
            .filter(|p| p.position.distance_squared(center) <= radius * radius)
            .min_by(|a, b| {
                a.position
                    .distance_squared(center)
                    .total_cmp(&b.position.distance_squared(center))
            })
            .cloned()
    }
}

impl WorldConditions for TestWorld {
    fn is_night(&self, _partition: &PartitionId) -> bool {
        self.night
    }
}
