//! Movement Systems
//!
//! Mobs walk toward whatever they are chasing; everyone else wanders.
//! Walls block both.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::f64::consts::TAU;

use sense_core::EntityQuery;
use sense_events::BlockPos;

use crate::components::{Alive, Creature, DirectTarget, EntityRef, Heading, LastPerception, Mob, Partition, Position};
use crate::world_index::WorldIndex;
use crate::SimRng;

/// Movement constants
pub mod constants {
    /// Step length while chasing a direct target
    pub const CHASE_SPEED: f64 = 0.3;
    /// Step length per unit of channel speed while following perception
    pub const PERCEPTION_SPEED: f64 = 0.25;
    /// Step length of a wandering creature
    pub const WANDER_SPEED: f64 = 0.15;
    /// Per-step chance a wanderer picks a new heading
    pub const TURN_CHANCE: f64 = 0.05;
    /// Creatures stay within this distance of the origin on x and z
    pub const WORLD_HALF_EXTENT: f64 = 96.0;
}

/// System: move mobs toward their direct target, or along their perception intent
pub fn apply_movement(
    index: Res<WorldIndex>,
    mut mobs: Query<
        (&mut Position, &Partition, &DirectTarget, &LastPerception),
        (With<Mob>, With<Alive>),
    >,
) {
    for (mut position, partition, direct, last) in mobs.iter_mut() {
        let partition = &partition.0;

        let step = if let Some(target) = direct.0 {
            index
                .position_of(partition, target)
                .map(|p| (p, constants::CHASE_SPEED))
        } else {
            last.0
                .movement
                .map(|intent| (intent.destination, constants::PERCEPTION_SPEED * intent.speed))
        };

        let Some((destination, speed)) = step else {
            continue;
        };
        let next = position.0.step_toward(&destination, speed);
        if !index.terrain().is_wall(partition, BlockPos::containing(next)) {
            position.0 = next;
        }
    }
}

/// System: wander non-mob creatures
///
/// Creatures are visited in id order so random draws are reproducible.
pub fn wander_creatures(
    index: Res<WorldIndex>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&EntityRef, &mut Position, &mut Heading, &Partition), (With<Creature>, With<Alive>)>,
) {
    let mut creatures: Vec<_> = query.iter_mut().collect();
    creatures.sort_by_key(|(entity, ..)| entity.0);

    for (_, mut position, mut heading, partition) in creatures {
        if rng.0.gen_bool(constants::TURN_CHANCE) {
            *heading = Heading::from_angle(rng.0.gen_range(0.0..TAU));
        }

        let mut next = position.0.offset(
            heading.dx * constants::WANDER_SPEED,
            0.0,
            heading.dz * constants::WANDER_SPEED,
        );
        if next.x.abs() > constants::WORLD_HALF_EXTENT {
            heading.dx = -heading.dx;
            next.x = position.0.x;
        }
        if next.z.abs() > constants::WORLD_HALF_EXTENT {
            heading.dz = -heading.dz;
            next.z = position.0.z;
        }

        if index.terrain().is_wall(&partition.0, BlockPos::containing(next)) {
            heading.dx = -heading.dx;
            heading.dz = -heading.dz;
            continue;
        }
        position.0 = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::build_world_index;
    use crate::terrain::Terrain;
    use crate::SimClock;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sense_core::{MovementIntent, PerceptionOutput};
    use sense_events::{Coord, EntityId, EntityKind, PartitionId};

    fn world_with(terrain: Terrain) -> World {
        let mut world = World::new();
        world.insert_resource(SimClock::new(0));
        world.insert_resource(SimRng(SmallRng::seed_from_u64(7)));
        world.insert_resource(WorldIndex::new(terrain));
        world
    }

    #[test]
    fn test_mob_follows_intent() {
        let mut world = world_with(Terrain::new());
        let destination = Coord::new(10.0, 64.0, 0.0);
        let mob = world
            .spawn((
                Mob::new("zombie"),
                Alive,
                Position(Coord::new(0.0, 64.0, 0.0)),
                Partition(PartitionId::from("overworld")),
                DirectTarget::default(),
                LastPerception(PerceptionOutput {
                    movement: Some(MovementIntent {
                        destination,
                        speed: 2.0,
                        entity: None,
                    }),
                    ..Default::default()
                }),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_movement);
        schedule.run(&mut world);

        let position = world.get::<Position>(mob).unwrap().0;
        assert!((position.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mob_chases_direct_target() {
        let mut world = world_with(Terrain::new());
        let overworld = PartitionId::from("overworld");
        world.spawn((
            EntityRef(EntityId(9)),
            Creature::new(EntityKind::Player),
            Alive,
            Position(Coord::new(0.0, 64.0, 5.0)),
            Partition(overworld.clone()),
        ));
        let mob = world
            .spawn((
                Mob::new("zombie"),
                Alive,
                Position(Coord::new(0.0, 64.0, 0.0)),
                Partition(overworld),
                DirectTarget(Some(EntityId(9))),
                LastPerception::default(),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems((build_world_index, apply_movement).chain());
        schedule.run(&mut world);

        let position = world.get::<Position>(mob).unwrap().0;
        assert!((position.z - constants::CHASE_SPEED).abs() < 1e-9);
    }

    #[test]
    fn test_wall_blocks_mob() {
        let overworld = PartitionId::from("overworld");
        let mut terrain = Terrain::new();
        terrain.add_wall(&overworld, BlockPos::new(1, 64, 0));
        let mut world = world_with(terrain);
        let mob = world
            .spawn((
                Mob::new("zombie"),
                Alive,
                Position(Coord::new(0.9, 64.0, 0.5)),
                Partition(overworld),
                DirectTarget::default(),
                LastPerception(PerceptionOutput {
                    movement: Some(MovementIntent {
                        destination: Coord::new(5.0, 64.0, 0.5),
                        speed: 1.0,
                        entity: None,
                    }),
                    ..Default::default()
                }),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_movement);
        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(mob).unwrap().0.x, 0.9);
    }

    #[test]
    fn test_wanderers_stay_in_bounds() {
        let mut world = world_with(Terrain::new());
        for i in 0..5 {
            world.spawn((
                EntityRef(EntityId(i)),
                Creature::new(EntityKind::Livestock),
                Alive,
                Heading::default(),
                Position(Coord::new(95.9, 64.0, 0.0)),
                Partition(PartitionId::from("overworld")),
            ));
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(wander_creatures);
        for _ in 0..200 {
            schedule.run(&mut world);
        }

        let mut query = world.query::<&Position>();
        for position in query.iter(&world) {
            assert!(position.0.x.abs() <= constants::WORLD_HALF_EXTENT);
            assert!(position.0.z.abs() <= constants::WORLD_HALF_EXTENT);
        }
    }
}
