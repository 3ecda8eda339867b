//! Terrain
//!
//! Static block state of the simulated world: attractor blocks, walls and
//! settlements. Built once at setup.

use std::collections::{HashMap, HashSet};

use sense_core::PointOfInterest;
use sense_events::{BlockPos, Coord, FeatureKind, PartitionId};

/// Sampling step of the line-of-sight ray march, in world units
const SIGHT_STEP: f64 = 0.5;

/// An attractor block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub weight: f32,
}

#[derive(Debug, Default)]
pub struct Terrain {
    features: HashMap<PartitionId, HashMap<BlockPos, Feature>>,
    walls: HashMap<PartitionId, HashSet<BlockPos>>,
    settlements: HashMap<PartitionId, Vec<PointOfInterest>>,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(&mut self, partition: &PartitionId, pos: BlockPos, kind: FeatureKind, weight: f32) {
        self.features
            .entry(partition.clone())
            .or_default()
            .insert(pos, Feature { kind, weight });
    }

    pub fn feature_at(&self, partition: &PartitionId, pos: BlockPos) -> Option<Feature> {
        self.features.get(partition)?.get(&pos).copied()
    }

    pub fn feature_count(&self, kind: FeatureKind) -> usize {
        self.features
            .values()
            .flat_map(|blocks| blocks.values())
            .filter(|f| f.kind == kind)
            .count()
    }

    /// Removes every attractor block within `radius` voxels (Chebyshev) of
    /// `center`, returning the removed positions in block order.
    pub fn remove_features_within(&mut self, partition: &PartitionId, center: BlockPos, radius: i32) -> Vec<BlockPos> {
        let Some(blocks) = self.features.get_mut(partition) else {
            return Vec::new();
        };
        let mut removed: Vec<BlockPos> = blocks
            .keys()
            .filter(|pos| {
                (pos.x - center.x).abs() <= radius
                    && (pos.y - center.y).abs() <= radius
                    && (pos.z - center.z).abs() <= radius
            })
            .copied()
            .collect();
        removed.sort();
        for pos in &removed {
            blocks.remove(pos);
        }
        removed
    }

    pub fn add_wall(&mut self, partition: &PartitionId, pos: BlockPos) {
        self.walls.entry(partition.clone()).or_default().insert(pos);
    }

    pub fn is_wall(&self, partition: &PartitionId, pos: BlockPos) -> bool {
        self.walls
            .get(partition)
            .map_or(false, |walls| walls.contains(&pos))
    }

    pub fn add_settlement(&mut self, partition: &PartitionId, position: Coord, label: impl Into<String>) {
        self.settlements
            .entry(partition.clone())
            .or_default()
            .push(PointOfInterest {
                position,
                label: label.into(),
            });
    }

    pub fn settlements(&self, partition: &PartitionId) -> &[PointOfInterest] {
        self.settlements
            .get(partition)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Marches from `from` to `to` and fails on the first wall block between
    /// them. The start and end blocks never block.
    pub fn line_of_sight(&self, partition: &PartitionId, from: &Coord, to: &Coord) -> bool {
        let Some(walls) = self.walls.get(partition) else {
            return true;
        };
        let distance = from.distance(to);
        if distance <= SIGHT_STEP {
            return true;
        }

        let start = BlockPos::containing(*from);
        let end = BlockPos::containing(*to);
        let samples = (distance / SIGHT_STEP).ceil() as usize;
        for i in 1..samples {
            let t = i as f64 / samples as f64;
            let point = Coord::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                from.z + (to.z - from.z) * t,
            );
            let block = BlockPos::containing(point);
            if block != start && block != end && walls.contains(&block) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> PartitionId {
        PartitionId::from("overworld")
    }

    #[test]
    fn test_remove_features_within() {
        let mut terrain = Terrain::new();
        terrain.add_feature(&overworld(), BlockPos::new(0, 64, 0), FeatureKind::Light, 1.0);
        terrain.add_feature(&overworld(), BlockPos::new(2, 64, -2), FeatureKind::Heat, 0.5);
        terrain.add_feature(&overworld(), BlockPos::new(6, 64, 0), FeatureKind::Light, 1.0);

        let removed = terrain.remove_features_within(&overworld(), BlockPos::new(1, 64, 0), 3);
        assert_eq!(removed, vec![BlockPos::new(0, 64, 0), BlockPos::new(2, 64, -2)]);
        assert!(terrain.feature_at(&overworld(), BlockPos::new(0, 64, 0)).is_none());
        assert!(terrain.feature_at(&overworld(), BlockPos::new(6, 64, 0)).is_some());
        assert!(terrain
            .remove_features_within(&PartitionId::from("nether"), BlockPos::new(1, 64, 0), 3)
            .is_empty());
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut terrain = Terrain::new();
        for y in 60..70 {
            terrain.add_wall(&overworld(), BlockPos::new(5, y, 0));
        }

        let from = Coord::new(0.5, 64.5, 0.5);
        assert!(!terrain.line_of_sight(&overworld(), &from, &Coord::new(10.5, 64.5, 0.5)));
        assert!(terrain.line_of_sight(&overworld(), &from, &Coord::new(4.5, 64.5, 0.5)));
        assert!(terrain.line_of_sight(&overworld(), &from, &Coord::new(0.5, 64.5, 10.5)));
    }

    #[test]
    fn test_walls_are_per_partition() {
        let mut terrain = Terrain::new();
        terrain.add_wall(&overworld(), BlockPos::new(5, 64, 0));

        let nether = PartitionId::from("nether");
        let from = Coord::new(0.5, 64.5, 0.5);
        let to = Coord::new(10.5, 64.5, 0.5);
        assert!(terrain.line_of_sight(&nether, &from, &to));
        assert!(!terrain.line_of_sight(&overworld(), &from, &to));
    }

    #[test]
    fn test_features() {
        let mut terrain = Terrain::new();
        terrain.add_feature(&overworld(), BlockPos::new(2, 64, 2), FeatureKind::Light, 0.8);
        terrain.add_feature(&overworld(), BlockPos::new(4, 64, 2), FeatureKind::Heat, 1.0);

        assert_eq!(
            terrain.feature_at(&overworld(), BlockPos::new(2, 64, 2)).map(|f| f.kind),
            Some(FeatureKind::Light)
        );
        assert_eq!(terrain.feature_count(FeatureKind::Heat), 1);
        assert!(terrain.feature_at(&PartitionId::from("nether"), BlockPos::new(2, 64, 2)).is_none());
    }
}
