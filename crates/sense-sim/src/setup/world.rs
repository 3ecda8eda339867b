//! Terrain Setup
//!
//! Lays out two partitions: an overworld with settlements, torches,
//! campfires and a few walls, and a nether of lava pools and glowstone.

use rand::rngs::SmallRng;
use rand::Rng;

use sense_events::{BlockPos, Coord, FeatureKind, PartitionId};

use crate::terrain::Terrain;

/// Partition names
pub const OVERWORLD: &str = "overworld";
pub const NETHER: &str = "nether";

/// Ground level every creature walks on
pub const GROUND_Y: i32 = 64;

/// Attractor blocks sit on even coordinates so the sampled grid sees them
fn even(v: i32) -> i32 {
    v & !1
}

fn random_block(rng: &mut SmallRng, extent: i32) -> BlockPos {
    BlockPos::new(
        even(rng.gen_range(-extent..=extent)),
        GROUND_Y,
        even(rng.gen_range(-extent..=extent)),
    )
}

/// Create the terrain for both partitions
pub fn create_terrain(rng: &mut SmallRng) -> Terrain {
    let mut terrain = Terrain::new();
    let overworld = PartitionId::from(OVERWORLD);
    let nether = PartitionId::from(NETHER);

    // === OVERWORLD ===
    let settlements = [
        ("millbrook", Coord::new(-48.0, 64.0, -48.0)),
        ("ashford", Coord::new(56.0, 64.0, 40.0)),
    ];
    for (label, center) in settlements {
        terrain.add_settlement(&overworld, center, label);

        // Torches ring each settlement
        let c = BlockPos::containing(center);
        for (dx, dz) in [(-8, -8), (8, -8), (-8, 8), (8, 8)] {
            terrain.add_feature(
                &overworld,
                BlockPos::new(even(c.x + dx), GROUND_Y, even(c.z + dz)),
                FeatureKind::Light,
                1.0,
            );
        }
        terrain.add_feature(
            &overworld,
            BlockPos::new(even(c.x), GROUND_Y, even(c.z + 4)),
            FeatureKind::Heat,
            0.8,
        );
    }

    // Scattered torches and campfires
    for _ in 0..12 {
        let pos = random_block(rng, 88);
        terrain.add_feature(&overworld, pos, FeatureKind::Light, 0.6);
    }
    for _ in 0..6 {
        let pos = random_block(rng, 88);
        terrain.add_feature(&overworld, pos, FeatureKind::Heat, 0.5);
    }

    // Wall segments, two blocks high
    for _ in 0..8 {
        let start = random_block(rng, 80);
        let along_x = rng.gen_bool(0.5);
        let length = rng.gen_range(4..12);
        for i in 0..length {
            let pos = if along_x {
                start.offset(i, 0, 0)
            } else {
                start.offset(0, 0, i)
            };
            terrain.add_wall(&overworld, pos);
            terrain.add_wall(&overworld, pos.offset(0, 1, 0));
        }
    }

    // === NETHER ===
    for _ in 0..10 {
        let pos = random_block(rng, 64);
        terrain.add_feature(&nether, pos, FeatureKind::Heat, 1.0);
    }
    for _ in 0..6 {
        let pos = random_block(rng, 64);
        terrain.add_feature(&nether, pos, FeatureKind::Light, 0.8);
    }

    terrain
}
