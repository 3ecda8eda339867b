//! Creature Spawning
//!
//! Spawns players, villagers, livestock and mobs with sequential entity ids.
//! Mob perception keys come from the seeded RNG, so a seed fixes every
//! agent's stagger slot.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

use sense_core::PerceptionContext;
use sense_events::{AgentKey, Coord, EntityId, EntityKind, PartitionId};

use super::world::{GROUND_Y, NETHER, OVERWORLD};
use crate::components::{
    Alive, Creature, DirectTarget, EntityRef, Heading, LastPerception, Mob, Partition, Perceiver, Position,
};

/// Mob kinds and their relative spawn weights
const MOB_KINDS: &[(&str, u32)] = &[
    ("zombie", 4),
    ("skeleton", 3),
    ("spider", 2),
    ("night_stalker", 1),
];

/// Share of mobs spawned in the overworld; the rest go to the nether
const OVERWORLD_MOB_SHARE: f64 = 0.8;

/// Creatures spawn within this distance of the origin on x and z
const SPAWN_EXTENT: f64 = 80.0;

/// Configuration for creature spawning
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub mobs: usize,
    pub players: usize,
    pub villagers: usize,
    pub livestock: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            mobs: 40,
            players: 4,
            villagers: 12,
            livestock: 10,
        }
    }
}

/// What was spawned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnSummary {
    pub players: usize,
    pub villagers: usize,
    pub livestock: usize,
    pub mobs_by_kind: BTreeMap<String, usize>,
}

impl SpawnSummary {
    pub fn total_mobs(&self) -> usize {
        self.mobs_by_kind.values().sum()
    }
}

fn random_position(rng: &mut SmallRng) -> Coord {
    Coord::new(
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        GROUND_Y as f64,
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
    )
}

fn pick_mob_kind(rng: &mut SmallRng) -> &'static str {
    let total: u32 = MOB_KINDS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (kind, weight) in MOB_KINDS {
        if roll < *weight {
            return *kind;
        }
        roll -= weight;
    }
    MOB_KINDS[0].0
}

/// Spawn one wandering creature in the overworld
fn spawn_creature(world: &mut World, rng: &mut SmallRng, id: EntityId, kind: EntityKind) -> Entity {
    let position = random_position(rng);
    let heading = Heading::from_angle(rng.gen_range(0.0..TAU));
    world
        .spawn((
            EntityRef(id),
            Creature::new(kind),
            Position(position),
            Partition(PartitionId::from(OVERWORLD)),
            heading,
            Alive,
        ))
        .id()
}

/// Spawn every creature and mob
pub fn spawn_all(
    world: &mut World,
    rng: &mut SmallRng,
    engine: &PerceptionContext,
    config: &SpawnConfig,
) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let mut next_id = 1u64;
    let mut allocate = || {
        let id = EntityId(next_id);
        next_id += 1;
        id
    };

    let creatures = [
        (EntityKind::Player, config.players),
        (EntityKind::Villager, config.villagers),
        (EntityKind::Livestock, config.livestock),
    ];
    for (kind, count) in creatures {
        for _ in 0..count {
            spawn_creature(world, rng, allocate(), kind);
        }
    }
    summary.players = config.players;
    summary.villagers = config.villagers;
    summary.livestock = config.livestock;

    for _ in 0..config.mobs {
        let kind = pick_mob_kind(rng);
        let partition = if rng.gen_bool(OVERWORLD_MOB_SHARE) {
            OVERWORLD
        } else {
            NETHER
        };
        let position = random_position(rng);
        let key = AgentKey::from_u128(rng.gen());

        world.spawn((
            EntityRef(allocate()),
            Mob::new(kind),
            Position(position),
            Partition(PartitionId::from(partition)),
            Perceiver(engine.spawn_controller(kind, key)),
            LastPerception::default(),
            DirectTarget::default(),
            Alive,
        ));
        *summary.mobs_by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }

    summary
}
