//! World Index
//!
//! Per-step snapshot of alive entities over the static terrain. This is the
//! host's implementation of the perception engine's world adapters.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use sense_core::{
    BlockSampler, EntityQuery, EntitySighting, PoiQuery, PointOfInterest, WorldConditions,
};
use sense_events::{Aabb, BlockPos, Coord, EntityId, EntityKind, FeatureKind, PartitionId};

use crate::terrain::Terrain;

/// Edge length of a spatial hash cell
const CELL_SIZE: f64 = 16.0;

type Cell = (i32, i32, i32);

fn cell_of(point: &Coord) -> Cell {
    (
        (point.x / CELL_SIZE).floor() as i32,
        (point.y / CELL_SIZE).floor() as i32,
        (point.z / CELL_SIZE).floor() as i32,
    )
}

/// Resource answering world queries for the current step
#[derive(Resource, Debug, Default)]
pub struct WorldIndex {
    terrain: Terrain,
    night: bool,
    cells: HashMap<PartitionId, HashMap<Cell, Vec<EntitySighting>>>,
    by_id: HashMap<EntityId, (PartitionId, EntitySighting)>,
}

impl WorldIndex {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            ..Self::default()
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    /// Drops last step's entities (called before rebuilding).
    pub fn begin_step(&mut self, night: bool) {
        self.night = night;
        self.cells.clear();
        self.by_id.clear();
    }

    pub fn insert(&mut self, partition: &PartitionId, sighting: EntitySighting) {
        self.cells
            .entry(partition.clone())
            .or_default()
            .entry(cell_of(&sighting.position))
            .or_default()
            .push(sighting);
        self.by_id.insert(sighting.id, (partition.clone(), sighting));
    }

    pub fn entity_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn sighting(&self, partition: &PartitionId, id: EntityId) -> Option<&EntitySighting> {
        self.by_id
            .get(&id)
            .filter(|(p, _)| p == partition)
            .map(|(_, sighting)| sighting)
    }
}

impl EntityQuery for WorldIndex {
    /// Results are ordered by id so callers see the same order every run.
    fn entities_in_box(
        &self,
        partition: &PartitionId,
        bounds: &Aabb,
        kinds: &[EntityKind],
    ) -> Vec<EntitySighting> {
        let Some(cells) = self.cells.get(partition) else {
            return Vec::new();
        };
        let (min, max) = (cell_of(&bounds.min), cell_of(&bounds.max));

        let mut found = Vec::new();
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    let Some(cell) = cells.get(&(x, y, z)) else {
                        continue;
                    };
                    found.extend(
                        cell.iter()
                            .filter(|s| kinds.contains(&s.kind) && bounds.contains(&s.position))
                            .copied(),
                    );
                }
            }
        }
        found.sort_by_key(|s| s.id);
        found
    }

    fn is_alive(&self, partition: &PartitionId, id: EntityId) -> bool {
        self.sighting(partition, id).is_some()
    }

    fn position_of(&self, partition: &PartitionId, id: EntityId) -> Option<Coord> {
        self.sighting(partition, id).map(|s| s.position)
    }

    fn has_line_of_sight(&self, partition: &PartitionId, from: &Coord, to: &Coord) -> bool {
        self.terrain.line_of_sight(partition, from, to)
    }
}

impl BlockSampler for WorldIndex {
    fn attraction(&self, kind: FeatureKind, partition: &PartitionId, pos: BlockPos) -> Option<f32> {
        self.terrain
            .feature_at(partition, pos)
            .filter(|f| f.kind == kind)
            .map(|f| f.weight)
    }
}

impl PoiQuery for WorldIndex {
    fn nearest_point_of_interest(
        &self,
        partition: &PartitionId,
        center: &Coord,
        radius: f64,
    ) -> Option<PointOfInterest> {
        let radius_sq = radius * radius;
        self.terrain
            .settlements(partition)
            .iter()
            .map(|poi| (poi.position.distance_squared(center), poi))
            .filter(|(d, _)| *d <= radius_sq)
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.label.cmp(&b.label)))
            .map(|(_, poi)| poi.clone())
    }
}

impl WorldConditions for WorldIndex {
    fn is_night(&self, _partition: &PartitionId) -> bool {
        self.night
    }
}
